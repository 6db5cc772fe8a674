use bson::Bson;
use std::collections::BTreeMap;

/// Results for a bulk write operation.
///
/// Ids are keyed by the index of the originating operation in the batch.
#[derive(Clone, Debug, PartialEq)]
pub struct BulkWriteResult {
    pub acknowledged: bool,
    pub inserted_count: i32,
    pub inserted_ids: BTreeMap<i64, Bson>,
    pub matched_count: i32,
    pub modified_count: i32,
    pub deleted_count: i32,
    pub upserted_count: i32,
    pub upserted_ids: BTreeMap<i64, Bson>,
}

impl BulkWriteResult {
    /// An acknowledged result with all counters at zero.
    pub fn new() -> BulkWriteResult {
        BulkWriteResult {
            acknowledged: true,
            inserted_count: 0,
            inserted_ids: BTreeMap::new(),
            matched_count: 0,
            modified_count: 0,
            deleted_count: 0,
            upserted_count: 0,
            upserted_ids: BTreeMap::new(),
        }
    }

    pub fn record_insert(&mut self, index: i64, id: Bson) {
        self.inserted_ids.insert(index, id);
        self.inserted_count += 1;
    }

    pub fn record_upsert(&mut self, index: i64, id: Bson) {
        self.upserted_ids.insert(index, id);
        self.upserted_count += 1;
    }
}

impl Default for BulkWriteResult {
    fn default() -> Self {
        BulkWriteResult::new()
    }
}
