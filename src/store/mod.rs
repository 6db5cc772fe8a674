//! The store-side bulk write facility consumed by bulk operations.
mod memory;

pub use self::memory::MemoryStore;

use crate::bulk::UnorderedBatch;
use crate::bulk::results::BulkWriteResult;
use crate::Result;

use std::sync::Arc;

/// Completion callback for a submitted batch. Invoked exactly once.
pub type Completion = Box<dyn FnOnce(Result<BulkWriteResult>) + Send + 'static>;

/// A store able to apply an unordered batch of writes in one round trip.
pub trait BulkWriteFacility: Send + Sync {
    /// Starts a new, empty unordered batch.
    fn initialize_unordered_bulk_op(&self) -> UnorderedBatch {
        UnorderedBatch::new()
    }

    /// Submits `batch` and reports its outcome through `callback`.
    fn execute(&self, batch: UnorderedBatch, callback: Completion);
}

impl<T: BulkWriteFacility + ?Sized> BulkWriteFacility for Arc<T> {
    fn initialize_unordered_bulk_op(&self) -> UnorderedBatch {
        (**self).initialize_unordered_bulk_op()
    }

    fn execute(&self, batch: UnorderedBatch, callback: Completion) {
        (**self).execute(batch, callback)
    }
}
