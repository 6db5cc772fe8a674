//! Normalization of domain objects into plain BSON documents.
use bson::{self, Bson, Document};
use serde::Serialize;

use crate::Error::ArgumentError;
use crate::Result;

/// The identity field of every stored document.
pub const ID_FIELD: &str = "_id";

/// Encodes a domain object into a plain, storage-ready document.
///
/// Encoder failures are returned unchanged. Values that do not encode to an
/// embedded document, such as bare scalars or arrays, are rejected.
pub fn to_document<T: Serialize + ?Sized>(item: &T) -> Result<Document> {
    match bson::to_bson(item)? {
        Bson::Document(document) => Ok(document),
        other => Err(ArgumentError(format!("Expected a document, but encoded {:?}.", other))),
    }
}

/// Removes the identity field from a document, returning its value if it was set.
pub fn strip_id(document: &mut Document) -> Option<Bson> {
    document.remove(ID_FIELD)
}
