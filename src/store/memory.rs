//! An in-memory bulk write facility.
use bson::{oid, Bson, Document};
use tracing::debug;

use super::{BulkWriteFacility, Completion};

use crate::bulk::UnorderedBatch;
use crate::bulk::error::{BulkWriteError, BulkWriteException};
use crate::bulk::options::WriteModel;
use crate::bulk::results::BulkWriteResult;
use crate::document::ID_FIELD;
use crate::{Error, Result};

use std::sync::Mutex;
use std::thread;

const DUPLICATE_KEY: i32 = 11000;
const FAILED_TO_PARSE: i32 = 9;
const IMMUTABLE_FIELD: i32 = 66;

/// A single collection held in memory.
///
/// Filters match by field equality and an empty filter matches every
/// document. Update payloads may use `$set` and `$unset`; a payload with no
/// operators is applied as a `$set`. Completions are delivered from a
/// separate thread, the way a driver reports from its I/O loop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    fail_next: Option<Error>,
    batches: usize,
}

enum Outcome {
    Applied,
    Rejected(i32, String),
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        Default::default()
    }

    /// Creates a store already holding `documents`.
    pub fn with_documents(documents: Vec<Document>) -> MemoryStore {
        MemoryStore {
            inner: Mutex::new(Inner { documents: documents, ..Default::default() }),
        }
    }

    /// Fails the next submitted batch with `error` without applying it.
    pub fn fail_next(&self, error: Error) -> Result<()> {
        let mut inner = self.inner.lock()?;
        inner.fail_next = Some(error);
        Ok(())
    }

    /// A snapshot of the stored documents, in insertion order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.inner.lock()?.documents.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.lock()?.documents.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The number of batches submitted so far.
    pub fn batches(&self) -> Result<usize> {
        Ok(self.inner.lock()?.batches)
    }

    fn apply_batch(&self, batch: UnorderedBatch) -> Result<BulkWriteResult> {
        let mut inner = self.inner.lock()?;
        inner.batches += 1;

        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }

        let mut result = BulkWriteResult::new();
        let mut write_errors = Vec::new();

        for (index, model) in batch.into_models().into_iter().enumerate() {
            let outcome = apply_model(&mut inner.documents, index as i64, &model, &mut result)?;

            if let Outcome::Rejected(code, message) = outcome {
                write_errors.push(BulkWriteError::new(index as i32, code, message, Some(model)));
            }
        }

        if write_errors.is_empty() {
            Ok(result)
        } else {
            Err(Error::BulkWriteError(BulkWriteException::new(write_errors, result)))
        }
    }
}

impl BulkWriteFacility for MemoryStore {
    fn execute(&self, batch: UnorderedBatch, callback: Completion) {
        let requests = batch.len();
        let outcome = self.apply_batch(batch);

        debug!(target: "bulkop::store", requests = requests, ok = outcome.is_ok(), "applied batch");

        thread::spawn(move || callback(outcome));
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| document.get(key) == Some(value))
}

fn new_id() -> Result<Bson> {
    Ok(Bson::ObjectId(oid::ObjectId::new()?))
}

fn has_operators(document: &Document) -> bool {
    document.keys().any(|key| key.starts_with('$'))
}

fn apply_model(documents: &mut Vec<Document>,
               index: i64,
               model: &WriteModel,
               result: &mut BulkWriteResult)
               -> Result<Outcome> {
    match *model {
        WriteModel::InsertOne { ref document } => {
            let mut document = document.clone();
            let id = match document.get(ID_FIELD) {
                Some(id) => id.clone(),
                None => {
                    let id = new_id()?;
                    document.insert(ID_FIELD, id.clone());
                    id
                }
            };

            if let Some(rejected) = duplicate_id(documents, &id) {
                return Ok(rejected);
            }

            documents.push(document);
            result.record_insert(index, id);
            Ok(Outcome::Applied)
        }
        WriteModel::DeleteOne { ref filter } => {
            if let Some(position) = documents.iter().position(|d| matches(d, filter)) {
                documents.remove(position);
                result.deleted_count += 1;
            }
            Ok(Outcome::Applied)
        }
        WriteModel::DeleteMany { ref filter } => {
            let before = documents.len();
            documents.retain(|d| !matches(d, filter));
            result.deleted_count += (before - documents.len()) as i32;
            Ok(Outcome::Applied)
        }
        WriteModel::ReplaceOne { ref filter, ref replacement, upsert } => {
            if has_operators(replacement) {
                return Ok(Outcome::Rejected(FAILED_TO_PARSE,
                                            "Replacement document must not contain update operators."
                                                .to_owned()));
            }

            match documents.iter().position(|d| matches(d, filter)) {
                Some(position) => {
                    result.matched_count += 1;

                    let existing = &documents[position];
                    let mut replaced = Document::new();
                    if let Some(id) = existing.get(ID_FIELD) {
                        if let Some(new_id) = replacement.get(ID_FIELD) {
                            if new_id != id {
                                return Ok(immutable_id());
                            }
                        }
                        replaced.insert(ID_FIELD, id.clone());
                    }
                    for (key, value) in replacement.iter() {
                        replaced.insert(key.clone(), value.clone());
                    }

                    if replaced != *existing {
                        result.modified_count += 1;
                        documents[position] = replaced;
                    }
                    Ok(Outcome::Applied)
                }
                None if upsert => upsert_document(documents, index, filter, replacement.clone(), result),
                None => Ok(Outcome::Applied),
            }
        }
        WriteModel::UpdateOne { ref filter, ref update, upsert } => {
            update_matching(documents, index, filter, update, upsert, false, result)
        }
        WriteModel::UpdateMany { ref filter, ref update, upsert } => {
            update_matching(documents, index, filter, update, upsert, true, result)
        }
    }
}

fn update_matching(documents: &mut Vec<Document>,
                   index: i64,
                   filter: &Document,
                   update: &Document,
                   upsert: bool,
                   multi: bool,
                   result: &mut BulkWriteResult)
                   -> Result<Outcome> {
    let positions: Vec<usize> = documents.iter()
        .enumerate()
        .filter(|&(_, d)| matches(d, filter))
        .map(|(i, _)| i)
        .take(if multi { usize::max_value() } else { 1 })
        .collect();

    if positions.is_empty() {
        if !upsert {
            return Ok(Outcome::Applied);
        }

        let mut seed = filter.clone();
        return match apply_update(&mut seed, update) {
            Outcome::Applied => upsert_document(documents, index, filter, seed, result),
            rejected => Ok(rejected),
        };
    }

    for position in positions {
        result.matched_count += 1;

        let mut updated = documents[position].clone();
        if let Outcome::Rejected(code, message) = apply_update(&mut updated, update) {
            return Ok(Outcome::Rejected(code, message));
        }

        if updated.get(ID_FIELD) != documents[position].get(ID_FIELD) {
            return Ok(immutable_id());
        }

        if updated != documents[position] {
            result.modified_count += 1;
            documents[position] = updated;
        }
    }

    Ok(Outcome::Applied)
}

fn apply_update(document: &mut Document, update: &Document) -> Outcome {
    if !has_operators(update) {
        set_fields(document, update);
        return Outcome::Applied;
    }

    for (operator, argument) in update.iter() {
        let fields = match *argument {
            Bson::Document(ref fields) => fields,
            _ => {
                return Outcome::Rejected(FAILED_TO_PARSE,
                                         format!("Modifiers operate on fields but we found \
                                                  {:?} for {}.",
                                                 argument,
                                                 operator));
            }
        };

        match operator.as_str() {
            "$set" => set_fields(document, fields),
            "$unset" => {
                for key in fields.keys() {
                    document.remove(key);
                }
            }
            _ if !operator.starts_with('$') => {
                return Outcome::Rejected(FAILED_TO_PARSE,
                                         format!("Unknown modifier: {}. Expected a valid update \
                                                  modifier or pipeline-style update.",
                                                 operator));
            }
            _ => {
                return Outcome::Rejected(FAILED_TO_PARSE,
                                         format!("Unsupported update operator: {}.", operator));
            }
        }
    }

    Outcome::Applied
}

fn set_fields(document: &mut Document, fields: &Document) {
    for (key, value) in fields.iter() {
        document.insert(key.clone(), value.clone());
    }
}

fn upsert_document(documents: &mut Vec<Document>,
                   index: i64,
                   filter: &Document,
                   payload: Document,
                   result: &mut BulkWriteResult)
                   -> Result<Outcome> {
    let id = match payload.get(ID_FIELD).or_else(|| filter.get(ID_FIELD)) {
        Some(id) => id.clone(),
        None => new_id()?,
    };

    if let Some(rejected) = duplicate_id(documents, &id) {
        return Ok(rejected);
    }

    let mut document = Document::new();
    document.insert(ID_FIELD, id.clone());
    for (key, value) in payload.iter() {
        document.insert(key.clone(), value.clone());
    }

    documents.push(document);
    result.record_upsert(index, id);
    Ok(Outcome::Applied)
}

fn duplicate_id(documents: &[Document], id: &Bson) -> Option<Outcome> {
    if documents.iter().any(|existing| existing.get(ID_FIELD) == Some(id)) {
        Some(Outcome::Rejected(DUPLICATE_KEY, format!("E11000 duplicate key error: {}", id)))
    } else {
        None
    }
}

fn immutable_id() -> Outcome {
    Outcome::Rejected(IMMUTABLE_FIELD,
                      "Performing an update on the path '_id' would modify the immutable field \
                       '_id'."
                          .to_owned())
}
