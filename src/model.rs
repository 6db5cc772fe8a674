//! Bulk write entry points bound to a model.
use serde::Serialize;

use crate::apm::{CompletionHook, Listener, StartHook};
use crate::bulk::UnorderedBatch;
use crate::bulk::options::{ModelOptions, OperationKind};
use crate::bulk::results::BulkWriteResult;
use crate::executor::{self, Submission};
use crate::matching::MatchFields;
use crate::store::BulkWriteFacility;
use crate::Result;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// A model backed by a store collection.
///
/// Every entry point normalizes its items, builds one unordered batch with a
/// write per item and submits it in a single request. Calls share no state
/// beyond the store handle, so any number of them may run concurrently.
#[derive(Clone)]
pub struct Model<S> {
    /// The namespace of the backing collection, formatted as db_name.coll_name.
    pub namespace: String,
    store: S,
    options: ModelOptions,
    listener: Arc<Listener>,
    req_id: Arc<AtomicI64>,
}

impl<S: BulkWriteFacility> Model<S> {
    /// Creates a model with default options.
    pub fn new(namespace: &str, store: S) -> Model<S> {
        Model::with_options(namespace, store, ModelOptions::new())
    }

    pub fn with_options(namespace: &str, store: S, options: ModelOptions) -> Model<S> {
        Model {
            namespace: namespace.to_owned(),
            store: store,
            options: options,
            listener: Arc::new(Listener::new()),
            req_id: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Registers a hook run before every batch is submitted.
    pub fn add_start_hook(&self, hook: StartHook) -> Result<()> {
        self.listener.add_start_hook(hook)
    }

    /// Registers a hook run after the store reports on every batch.
    pub fn add_completion_hook(&self, hook: CompletionHook) -> Result<()> {
        self.listener.add_completion_hook(hook)
    }

    /// Resolves the match fields for a call against this model's defaults.
    pub fn match_fields(&self, explicit: Option<&[&str]>) -> MatchFields {
        MatchFields::resolve(explicit, &self.options.upsert_match_fields)
    }

    /// Replaces one matching document per item, inserting it if none matches.
    pub async fn bulk_upsert_replace_one<T: Serialize>(&self,
                                                       items: &[T],
                                                       match_fields: Option<&[&str]>)
                                                       -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::ReplaceOne, true).await
    }

    /// Updates one matching document per item, inserting it if none matches.
    pub async fn bulk_upsert_update_one<T: Serialize>(&self,
                                                      items: &[T],
                                                      match_fields: Option<&[&str]>)
                                                      -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::UpdateOne, true).await
    }

    /// Updates every matching document per item, inserting one if none matches.
    pub async fn bulk_upsert_update<T: Serialize>(&self,
                                                  items: &[T],
                                                  match_fields: Option<&[&str]>)
                                                  -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::UpdateMany, true).await
    }

    pub async fn bulk_replace_one<T: Serialize>(&self,
                                                items: &[T],
                                                match_fields: Option<&[&str]>)
                                                -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::ReplaceOne, false).await
    }

    pub async fn bulk_update_one<T: Serialize>(&self,
                                               items: &[T],
                                               match_fields: Option<&[&str]>)
                                               -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::UpdateOne, false).await
    }

    pub async fn bulk_update<T: Serialize>(&self,
                                           items: &[T],
                                           match_fields: Option<&[&str]>)
                                           -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::UpdateMany, false).await
    }

    /// Removes the first document matching each item.
    pub async fn bulk_remove_one<T: Serialize>(&self,
                                               items: &[T],
                                               match_fields: Option<&[&str]>)
                                               -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::RemoveOne, false).await
    }

    /// Removes every document matching each item.
    pub async fn bulk_remove<T: Serialize>(&self,
                                           items: &[T],
                                           match_fields: Option<&[&str]>)
                                           -> Result<BulkWriteResult> {
        self.bulk_find(items, match_fields, OperationKind::RemoveMany, false).await
    }

    /// Inserts every item as a new document. Identity fields are dropped so
    /// the store assigns fresh ones.
    pub async fn bulk_insert<T: Serialize>(&self, items: &[T]) -> Result<BulkWriteResult> {
        let mut batch = self.store.initialize_unordered_bulk_op();
        batch.append(items, &MatchFields::identity(), OperationKind::Insert, false)?;
        self.submit(batch, OperationKind::Insert).await
    }

    async fn bulk_find<T: Serialize>(&self,
                                     items: &[T],
                                     match_fields: Option<&[&str]>,
                                     kind: OperationKind,
                                     upsert: bool)
                                     -> Result<BulkWriteResult> {
        let match_fields = self.match_fields(match_fields);

        let mut batch = self.store.initialize_unordered_bulk_op();
        batch.append(items, &match_fields, kind, upsert)?;
        self.submit(batch, kind).await
    }

    async fn submit(&self, batch: UnorderedBatch, kind: OperationKind) -> Result<BulkWriteResult> {
        let submission = Submission {
            operation: kind.name(),
            namespace: &self.namespace,
            request_id: self.req_id.fetch_add(1, Ordering::SeqCst),
            listener: &self.listener,
        };

        executor::execute(&self.store, batch, submission).await
    }
}
