//! Construction of unordered bulk write batches.
pub mod error;
pub mod options;
pub mod results;

use bson::Document;
use serde::Serialize;
use tracing::{debug, trace};

use self::options::{OperationKind, WriteModel};

use crate::document::{strip_id, to_document};
use crate::matching::{extract_filter, MatchFields};
use crate::Result;

use std::slice;

/// A collection of writes submitted to the store in a single request.
///
/// Models are kept in the order they were appended, but the store may apply
/// them in any order and a failed write does not roll back the others.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnorderedBatch {
    models: Vec<WriteModel>,
}

impl UnorderedBatch {
    pub fn new() -> UnorderedBatch {
        Default::default()
    }

    /// Builds a fresh batch with one write per item. See `append`.
    pub fn build<T: Serialize>(items: &[T],
                               match_fields: &MatchFields,
                               kind: OperationKind,
                               upsert: bool)
                               -> Result<UnorderedBatch> {
        let mut batch = UnorderedBatch::new();
        batch.append(items, match_fields, kind, upsert)?;
        Ok(batch)
    }

    /// Appends one write per item, in input order.
    ///
    /// Each item is normalized, a filter is extracted from `match_fields` for
    /// every kind but inserts, and the identity field is stripped from the
    /// payload of upserts and inserts. A normalization failure aborts before
    /// anything is appended.
    pub fn append<T: Serialize>(&mut self,
                                items: &[T],
                                match_fields: &MatchFields,
                                kind: OperationKind,
                                upsert: bool)
                                -> Result<()> {
        let mut models = Vec::with_capacity(items.len());

        for item in items {
            let mut document = to_document(item)?;

            let filter = if kind.takes_filter() {
                extract_filter(&document, match_fields)
            } else {
                Document::new()
            };

            if kind.takes_payload() && (upsert || kind == OperationKind::Insert) {
                // The store rejects identity mutation on these paths.
                strip_id(&mut document);
            }

            models.push(WriteModel::new(kind, filter, document, upsert));
        }

        for model in models {
            self.push(model);
        }

        debug!(target: "bulkop::bulk",
               operation = kind.name(),
               upsert = upsert,
               requests = self.len(),
               "built unordered batch");

        Ok(())
    }

    /// Builds one insert per item, each with its identity field removed.
    pub fn build_insert<T: Serialize>(items: &[T]) -> Result<UnorderedBatch> {
        UnorderedBatch::build(items, &MatchFields::identity(), OperationKind::Insert, false)
    }

    pub fn push(&mut self, model: WriteModel) {
        trace!(target: "bulkop::bulk", operation = model.kind().name(), "appending write");
        self.models.push(model);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<WriteModel> {
        self.models.iter()
    }

    pub fn models(&self) -> &[WriteModel] {
        &self.models
    }

    pub fn into_models(self) -> Vec<WriteModel> {
        self.models
    }
}

impl<'a> IntoIterator for &'a UnorderedBatch {
    type Item = &'a WriteModel;
    type IntoIter = slice::Iter<'a, WriteModel>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
