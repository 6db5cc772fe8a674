//! Write errors reported by the store for a bulk operation.
use super::options::WriteModel;
use super::results::BulkWriteResult;

use std::{error, fmt};

/// The error struct for a bulk write the store could not fully apply.
///
/// Operations not listed in `write_errors` may still have been applied;
/// their effect is summarized in `result`.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkWriteException {
    pub write_errors: Vec<BulkWriteError>,
    pub result: BulkWriteResult,
    pub message: String,
}

/// The error struct for a single bulk-write step, indicating the request
/// and its index in the original batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkWriteError {
    pub index: i32,
    pub code: i32,
    pub message: String,
    pub request: Option<WriteModel>,
}

impl BulkWriteException {
    pub fn new(write_errors: Vec<BulkWriteError>, result: BulkWriteResult) -> BulkWriteException {
        let message = format!("{} write error(s) in bulk operation.", write_errors.len());

        BulkWriteException {
            write_errors: write_errors,
            result: result,
            message: message,
        }
    }
}

impl BulkWriteError {
    pub fn new<T: ToString>(index: i32, code: i32, message: T, request: Option<WriteModel>) -> BulkWriteError {
        BulkWriteError {
            index: index,
            code: code,
            message: message.to_string(),
            request: request,
        }
    }
}

impl error::Error for BulkWriteException {}

impl error::Error for BulkWriteError {}

impl fmt::Display for BulkWriteException {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "BulkWriteException: {}", self.message)?;

        for v in &self.write_errors {
            write!(fmt, "\n{}", v)?;
        }

        Ok(())
    }
}

impl fmt::Display for BulkWriteError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "BulkWriteError at index {} (code {}): {}",
            self.index,
            self.code,
            self.message
        )?;

        match self.request {
            Some(ref request) => write!(fmt, " Failed to execute request {:?}.", request),
            None => fmt.write_str(" No additional error information was received."),
        }
    }
}
