//! Error and Result types for bulk operations.
use bson::{self, oid};
use crate::bulk::error::BulkWriteException;

use std::{error, fmt, sync};

/// A type for results generated by bulk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for bulk operations.
#[derive(Debug)]
pub enum Error {
    /// A domain object could not be encoded into a BSON document.
    EncoderError(bson::EncoderError),
    /// An ObjectId could not be generated.
    OIDError(oid::Error),
    /// The store rejected one or more operations in a batch.
    BulkWriteError(BulkWriteException),
    /// An invalid argument was provided.
    ArgumentError(String),
    /// A store-side or execution failure with no richer description.
    OperationError(String),
    /// A lock guarding shared state was poisoned.
    LockError,
}

impl From<bson::EncoderError> for Error {
    fn from(err: bson::EncoderError) -> Error {
        Error::EncoderError(err)
    }
}

impl From<oid::Error> for Error {
    fn from(err: oid::Error) -> Error {
        Error::OIDError(err)
    }
}

impl From<BulkWriteException> for Error {
    fn from(err: BulkWriteException) -> Error {
        Error::BulkWriteError(err)
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Error {
        Error::LockError
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::EncoderError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::OIDError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::BulkWriteError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::ArgumentError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::OperationError(ref inner) => fmt::Display::fmt(inner, fmt),
            Error::LockError => fmt.write_str("Lock poisoned."),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::EncoderError(ref inner) => Some(inner),
            Error::OIDError(ref inner) => Some(inner),
            Error::BulkWriteError(ref inner) => Some(inner),
            _ => None,
        }
    }
}
