use std::fmt::{Display, Error, Formatter};
use std::time::Duration;

use crate::bulk::results::BulkWriteResult;
use crate::error::Error as BulkError;

/// Published immediately before a batch is submitted.
pub struct BulkStarted {
    pub operation: &'static str,
    pub namespace: String,
    pub request_count: usize,
    pub request_id: i64,
}

impl Display for BulkStarted {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        fmt.write_fmt(format_args!("BULK.{} {} STARTED: {} request(s)", self.operation,
                                   self.namespace, self.request_count))
    }
}

/// Published once the store reports the outcome of a batch.
pub enum BulkCompleted<'a> {
    Success {
        duration: Duration,
        result: &'a BulkWriteResult,
        operation: &'static str,
        namespace: String,
        request_id: i64,
    },
    Failure {
        duration: Duration,
        failure: &'a BulkError,
        operation: &'static str,
        namespace: String,
        request_id: i64,
    },
}

impl<'a> BulkCompleted<'a> {
    pub fn request_id(&self) -> i64 {
        match *self {
            BulkCompleted::Success { request_id, .. } |
            BulkCompleted::Failure { request_id, .. } => request_id,
        }
    }

    pub fn duration(&self) -> Duration {
        match *self {
            BulkCompleted::Success { duration, .. } |
            BulkCompleted::Failure { duration, .. } => duration,
        }
    }
}

impl<'a> Display for BulkCompleted<'a> {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), Error> {
        match *self {
            BulkCompleted::Success { duration, result, operation, ref namespace, .. } => {
                fmt.write_fmt(format_args!("BULK.{} {} COMPLETED: {:?} ({} ns)", operation,
                                           namespace, result, duration.as_nanos()))
            }
            BulkCompleted::Failure { duration, failure, operation, ref namespace, .. } => {
                fmt.write_fmt(format_args!("BULK.{} {} FAILURE: {} ({} ns)", operation,
                                           namespace, failure, duration.as_nanos()))
            }
        }
    }
}
