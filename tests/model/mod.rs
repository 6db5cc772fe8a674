use bson::{bson, doc, Bson, Document};
use bulkop::{BulkCompleted, BulkWriteFacility, Completion, Error, MemoryStore, Model, ModelOptions,
             UnorderedBatch};

use crate::Person;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn sorted_by_id(mut documents: Vec<Document>) -> Vec<Document> {
    documents.sort_by_key(|d| d.get_str("_id").unwrap_or("").to_owned());
    documents
}

#[tokio::test]
async fn bulk_insert_assigns_fresh_ids() {
    let people = Model::new("test.people", MemoryStore::new());
    let items = vec![doc! { "name": "a" }, doc! { "_id": "x", "name": "b" }];

    let result = people.bulk_insert(&items).await.unwrap();
    assert_eq!(result.inserted_count, 2);
    assert_eq!(result.inserted_ids.len(), 2);

    let stored = people.store().documents().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].get_str("name").unwrap(), "b");
    match stored[1].get("_id") {
        Some(&Bson::ObjectId(_)) => (),
        other => panic!("Expected a generated ObjectId, got {:?}", other),
    }
}

#[tokio::test]
async fn bulk_upsert_replace_one_inserts_then_replaces() {
    let people = Model::new("test.people", MemoryStore::new());

    let result = people.bulk_upsert_replace_one(&[doc! { "_id": "1", "v": 2 }], Some(&["_id"][..]))
        .await
        .unwrap();
    assert_eq!(result.upserted_count, 1);
    assert_eq!(result.upserted_ids.get(&0), Some(&Bson::String("1".to_owned())));

    let result = people.bulk_upsert_replace_one(&[doc! { "_id": "1", "w": 3 }], None)
        .await
        .unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);
    assert_eq!(result.upserted_count, 0);

    assert_eq!(people.store().documents().unwrap(), vec![doc! { "_id": "1", "w": 3 }]);
}

#[tokio::test]
async fn bulk_upsert_update_one_is_idempotent() {
    let people = Model::new("test.people", MemoryStore::new());
    let items = vec![Person::new(Some("1"), "a@x.com", 30)];

    people.bulk_upsert_update_one(&items, Some(&["_id"][..])).await.unwrap();
    let once = people.store().documents().unwrap();

    let result = people.bulk_upsert_update_one(&items, Some(&["_id"][..])).await.unwrap();
    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 0);
    assert_eq!(people.store().documents().unwrap(), once);
    assert_eq!(once, vec![doc! { "_id": "1", "email": "a@x.com", "age": 30 }]);
}

#[tokio::test]
async fn configured_match_fields_are_the_default() {
    let store = MemoryStore::with_documents(vec![
        doc! { "_id": "1", "email": "a@x.com", "age": 30 },
        doc! { "_id": "2", "email": "b@x.com", "age": 40 },
    ]);
    let options = ModelOptions::new().with_upsert_match_fields(vec!["email"]);
    let people = Model::with_options("test.people", store, options);

    let items = vec![Person::new(None, "b@x.com", 41), Person::new(None, "c@x.com", 50)];
    let result = people.bulk_upsert_update(&items, None).await.unwrap();

    assert_eq!(result.matched_count, 1);
    assert_eq!(result.modified_count, 1);
    assert_eq!(result.upserted_count, 1);
    assert!(result.upserted_ids.contains_key(&1));

    let stored = people.store().documents().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1], doc! { "_id": "2", "email": "b@x.com", "age": 41 });
    assert_eq!(stored[2].get_str("email").unwrap(), "c@x.com");
}

#[tokio::test]
async fn bulk_update_without_upsert_skips_unmatched() {
    let store = MemoryStore::with_documents(vec![
        doc! { "_id": "1", "a": 0 },
        doc! { "_id": "2", "a": 0 },
    ]);
    let model = Model::new("test.items", store);

    let items = vec![doc! { "_id": "1", "a": 1 }, doc! { "_id": "3", "a": 3 }];
    let result = model.bulk_update(&items, None).await.unwrap();

    assert_eq!(result.matched_count, 1);
    assert_eq!(result.upserted_count, 0);
    assert_eq!(sorted_by_id(model.store().documents().unwrap()), vec![
        doc! { "_id": "1", "a": 1 },
        doc! { "_id": "2", "a": 0 },
    ]);
}

#[tokio::test]
async fn bulk_update_one_touches_a_single_match() {
    let store = MemoryStore::with_documents(vec![
        doc! { "_id": "1", "group": "g", "n": 0 },
        doc! { "_id": "2", "group": "g", "n": 0 },
    ]);
    let model = Model::new("test.items", store);

    let result = model.bulk_update_one(&[doc! { "group": "g", "n": 1 }], Some(&["group"][..]))
        .await
        .unwrap();
    assert_eq!(result.matched_count, 1);

    let result = model.bulk_update(&[doc! { "group": "g", "n": 2 }], Some(&["group"][..]))
        .await
        .unwrap();
    assert_eq!(result.matched_count, 2);
    assert_eq!(result.modified_count, 2);
}

#[tokio::test]
async fn bulk_replace_one_keeps_stored_identity() {
    let store = MemoryStore::with_documents(vec![doc! { "_id": "1", "email": "a@x.com", "old": true }]);
    let model = Model::new("test.people", store);

    let result = model.bulk_replace_one(&[doc! { "email": "a@x.com", "new": true }], Some(&["email"][..]))
        .await
        .unwrap();
    assert_eq!(result.modified_count, 1);
    assert_eq!(model.store().documents().unwrap(),
               vec![doc! { "_id": "1", "email": "a@x.com", "new": true }]);
}

#[tokio::test]
async fn bulk_remove_one_and_bulk_remove() {
    let store = MemoryStore::with_documents(vec![
        doc! { "_id": "1", "email": "a@x.com" },
        doc! { "_id": "2", "email": "a@x.com" },
        doc! { "_id": "3", "email": "a@x.com" },
        doc! { "_id": "4", "email": "b@x.com" },
    ]);
    let model = Model::new("test.people", store);
    let items = vec![doc! { "email": "a@x.com" }];

    let result = model.bulk_remove_one(&items, Some(&["email"][..])).await.unwrap();
    assert_eq!(result.deleted_count, 1);
    assert_eq!(model.store().len().unwrap(), 3);

    let result = model.bulk_remove(&items, Some(&["email"][..])).await.unwrap();
    assert_eq!(result.deleted_count, 2);
    assert_eq!(model.store().documents().unwrap(), vec![doc! { "_id": "4", "email": "b@x.com" }]);
}

#[tokio::test]
async fn store_error_is_returned_unchanged() {
    let model = Model::new("test.people", MemoryStore::new());
    model.store().fail_next(Error::OperationError("connection reset".to_owned())).unwrap();

    match model.bulk_insert(&[doc! { "a": 1 }]).await {
        Err(Error::OperationError(ref message)) => assert_eq!(message, "connection reset"),
        other => panic!("Expected OperationError, got {:?}", other),
    }
    assert!(model.store().is_empty().unwrap());
}

#[tokio::test]
async fn per_operation_failures_surface_as_bulk_write_error() {
    let store = MemoryStore::with_documents(vec![doc! { "_id": "2", "email": "a@x.com" }]);
    let model = Model::new("test.people", store);

    let items = vec![Person::new(Some("1"), "a@x.com", 30), Person::new(Some("9"), "z@x.com", 1)];
    match model.bulk_update_one(&items, Some(&["email"][..])).await {
        Err(Error::BulkWriteError(exception)) => {
            assert_eq!(exception.write_errors.len(), 1);
            assert_eq!(exception.write_errors[0].index, 0);
            assert_eq!(exception.write_errors[0].code, 66);
            assert_eq!(exception.result.matched_count, 1);
        }
        other => panic!("Expected BulkWriteError, got {:?}", other),
    }
}

#[tokio::test]
async fn normalization_error_prevents_submission() {
    let model = Model::new("test.people", MemoryStore::new());

    match model.bulk_upsert_update_one(&["not a document"], None).await {
        Err(Error::ArgumentError(_)) => (),
        other => panic!("Expected ArgumentError, got {:?}", other),
    }
    assert_eq!(model.store().batches().unwrap(), 0);
}

#[tokio::test]
async fn concurrent_calls_use_separate_batches() {
    let model = Model::new("test.people", Arc::new(MemoryStore::new()));

    let first = vec![doc! { "n": 1 }, doc! { "n": 2 }];
    let second = vec![doc! { "n": 3 }];
    let (a, b) = tokio::join!(model.bulk_insert(&first), model.bulk_insert(&second));

    assert_eq!(a.unwrap().inserted_count, 2);
    assert_eq!(b.unwrap().inserted_count, 1);
    assert_eq!(model.store().batches().unwrap(), 2);
    assert_eq!(model.store().len().unwrap(), 3);
}

#[test]
fn model_options_deserialize_from_config() {
    let options: ModelOptions = serde_json::from_str(r#"{ "upsertMatchFields": ["email", "tenant"] }"#)
        .unwrap();
    assert_eq!(options.upsert_match_fields, vec!["email".to_owned(), "tenant".to_owned()]);

    let empty: ModelOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, ModelOptions::new());

    let model = Model::with_options("test.people", MemoryStore::new(), options);
    assert_eq!(model.match_fields(None).into_vec(), vec!["email".to_owned(), "tenant".to_owned()]);
    assert_eq!(model.match_fields(Some(&["_id"][..])).into_vec(), vec!["_id".to_owned()]);
}

#[tokio::test]
async fn upsert_with_taken_identity_keeps_store_unique() {
    let store = MemoryStore::with_documents(vec![doc! { "_id": "1", "email": "a" }]);
    let model = Model::new("test.people", store);

    match model.bulk_upsert_update_one(&[doc! { "_id": "1", "email": "b" }], Some(&["_id", "email"][..]))
        .await {
        Err(Error::BulkWriteError(exception)) => assert_eq!(exception.write_errors[0].code, 11000),
        other => panic!("Expected BulkWriteError, got {:?}", other),
    }
    assert_eq!(model.store().documents().unwrap(), vec![doc! { "_id": "1", "email": "a" }]);
}

/// A store that loses every batch without reporting back.
struct SilentStore;

impl BulkWriteFacility for SilentStore {
    fn execute(&self, _batch: UnorderedBatch, callback: Completion) {
        drop(callback);
    }
}

static DROPPED_FAILURES: AtomicUsize = AtomicUsize::new(0);

fn count_dropped(completed: &BulkCompleted) {
    if let BulkCompleted::Failure { failure: &Error::OperationError(_), .. } = *completed {
        DROPPED_FAILURES.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn dropped_callback_fails_the_call() {
    let model = Model::new("test.people", SilentStore);
    model.add_completion_hook(count_dropped).unwrap();

    match model.bulk_insert(&[doc! { "a": 1 }]).await {
        Err(Error::OperationError(ref message)) => {
            assert_eq!(message, "bulk write callback dropped")
        }
        other => panic!("Expected OperationError, got {:?}", other),
    }
    assert_eq!(DROPPED_FAILURES.load(Ordering::SeqCst), 1);
}
