//! Resolution of match fields and extraction of match filters.
use bson::Document;

use crate::document::ID_FIELD;

use std::ops::Deref;

/// An ordered, non-empty list of field names used to build match filters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchFields(Vec<String>);

impl MatchFields {
    /// Picks the match fields for a call.
    ///
    /// An explicit non-empty list wins, then a non-empty configured default,
    /// and finally the identity field alone.
    pub fn resolve<S: AsRef<str>>(explicit: Option<&[S]>, default: &[String]) -> MatchFields {
        if let Some(fields) = explicit {
            if !fields.is_empty() {
                return MatchFields(fields.iter().map(|f| f.as_ref().to_owned()).collect());
            }
        }

        if !default.is_empty() {
            return MatchFields(default.to_vec());
        }

        MatchFields::identity()
    }

    /// The single-element list containing the identity field.
    pub fn identity() -> MatchFields {
        MatchFields(vec![ID_FIELD.to_owned()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for MatchFields {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Projects a document onto the given fields.
///
/// Fields absent from the document are left out of the filter. If none of
/// the fields are present, the filter is empty.
pub fn extract_filter(document: &Document, fields: &[String]) -> Document {
    let mut filter = Document::new();

    for field in fields {
        if let Some(value) = document.get(field) {
            filter.insert(field.clone(), value.clone());
        }
    }

    filter
}
