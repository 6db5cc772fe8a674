//! Write models and model-level options for bulk operations.
use bson::Document;
use serde_derive::Deserialize;

/// The kinds of write a bulk entry point can append to a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    ReplaceOne,
    UpdateOne,
    UpdateMany,
    RemoveOne,
    RemoveMany,
}

impl OperationKind {
    /// The store-side name of the operation.
    pub fn name(&self) -> &'static str {
        match *self {
            OperationKind::Insert => "insert",
            OperationKind::ReplaceOne => "replaceOne",
            OperationKind::UpdateOne => "updateOne",
            OperationKind::UpdateMany => "update",
            OperationKind::RemoveOne => "removeOne",
            OperationKind::RemoveMany => "remove",
        }
    }

    pub fn takes_filter(&self) -> bool {
        *self != OperationKind::Insert
    }

    pub fn takes_payload(&self) -> bool {
        match *self {
            OperationKind::RemoveOne | OperationKind::RemoveMany => false,
            _ => true,
        }
    }
}

/// A single write, as submitted to the store in an unordered batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteModel {
    InsertOne { document: Document },
    DeleteOne { filter: Document },
    DeleteMany { filter: Document },
    ReplaceOne {
        filter: Document,
        replacement: Document,
        upsert: bool,
    },
    UpdateOne {
        filter: Document,
        update: Document,
        upsert: bool,
    },
    UpdateMany {
        filter: Document,
        update: Document,
        upsert: bool,
    },
}

impl WriteModel {
    /// Builds the write for `kind`.
    ///
    /// Remove kinds never carry a payload or an upsert flag; whatever was
    /// passed for them is discarded.
    pub fn new(kind: OperationKind, filter: Document, payload: Document, upsert: bool) -> WriteModel {
        match kind {
            OperationKind::Insert => WriteModel::InsertOne { document: payload },
            OperationKind::ReplaceOne => WriteModel::ReplaceOne {
                filter: filter,
                replacement: payload,
                upsert: upsert,
            },
            OperationKind::UpdateOne => WriteModel::UpdateOne {
                filter: filter,
                update: payload,
                upsert: upsert,
            },
            OperationKind::UpdateMany => WriteModel::UpdateMany {
                filter: filter,
                update: payload,
                upsert: upsert,
            },
            OperationKind::RemoveOne => WriteModel::DeleteOne { filter: filter },
            OperationKind::RemoveMany => WriteModel::DeleteMany { filter: filter },
        }
    }

    pub fn kind(&self) -> OperationKind {
        match *self {
            WriteModel::InsertOne { .. } => OperationKind::Insert,
            WriteModel::DeleteOne { .. } => OperationKind::RemoveOne,
            WriteModel::DeleteMany { .. } => OperationKind::RemoveMany,
            WriteModel::ReplaceOne { .. } => OperationKind::ReplaceOne,
            WriteModel::UpdateOne { .. } => OperationKind::UpdateOne,
            WriteModel::UpdateMany { .. } => OperationKind::UpdateMany,
        }
    }

    /// The match filter, absent for inserts.
    pub fn filter(&self) -> Option<&Document> {
        match *self {
            WriteModel::InsertOne { .. } => None,
            WriteModel::DeleteOne { ref filter } |
            WriteModel::DeleteMany { ref filter } |
            WriteModel::ReplaceOne { ref filter, .. } |
            WriteModel::UpdateOne { ref filter, .. } |
            WriteModel::UpdateMany { ref filter, .. } => Some(filter),
        }
    }

    /// The document payload, absent for removals.
    pub fn payload(&self) -> Option<&Document> {
        match *self {
            WriteModel::InsertOne { ref document } => Some(document),
            WriteModel::ReplaceOne { ref replacement, .. } => Some(replacement),
            WriteModel::UpdateOne { ref update, .. } |
            WriteModel::UpdateMany { ref update, .. } => Some(update),
            WriteModel::DeleteOne { .. } | WriteModel::DeleteMany { .. } => None,
        }
    }

    pub fn is_upsert(&self) -> bool {
        match *self {
            WriteModel::ReplaceOne { upsert, .. } |
            WriteModel::UpdateOne { upsert, .. } |
            WriteModel::UpdateMany { upsert, .. } => upsert,
            _ => false,
        }
    }
}

/// Per-model configuration for bulk operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelOptions {
    /// Fields used to build match filters when a call does not name any.
    pub upsert_match_fields: Vec<String>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_upsert_match_fields<S: Into<String>>(mut self, fields: Vec<S>) -> Self {
        self.upsert_match_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}
