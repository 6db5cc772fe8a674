//! Submission of a built batch to the store.
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::apm::{BulkCompleted, BulkStarted, Listener};
use crate::bulk::UnorderedBatch;
use crate::bulk::results::BulkWriteResult;
use crate::store::BulkWriteFacility;
use crate::Error::OperationError;
use crate::Result;

use std::time::Instant;

/// Describes the submission for monitoring purposes.
pub struct Submission<'a> {
    pub operation: &'static str,
    pub namespace: &'a str,
    pub request_id: i64,
    pub listener: &'a Listener,
}

/// Submits `batch` to the store as a single unordered request and waits
/// for its completion.
///
/// The store's result or error is returned unchanged. There is no retry,
/// timeout or cancellation once the batch has been handed to the store.
pub async fn execute<S>(store: &S, batch: UnorderedBatch, submission: Submission<'_>) -> Result<BulkWriteResult>
    where S: BulkWriteFacility + ?Sized
{
    let started = BulkStarted {
        operation: submission.operation,
        namespace: submission.namespace.to_owned(),
        request_count: batch.len(),
        request_id: submission.request_id,
    };

    debug!(target: "bulkop::bulk",
           operation = submission.operation,
           namespace = submission.namespace,
           request_id = submission.request_id,
           requests = batch.len(),
           "submitting unordered batch");

    submission.listener.run_start_hooks(&started)?;

    let (tx, rx) = oneshot::channel::<Result<BulkWriteResult>>();
    let timer = Instant::now();

    store.execute(batch, Box::new(move |outcome| {
        // The receiver only goes away if the caller stopped waiting.
        let _ = tx.send(outcome);
    }));

    let outcome = match rx.await {
        Ok(outcome) => outcome,
        Err(_) => Err(OperationError(String::from("bulk write callback dropped"))),
    };

    let duration = timer.elapsed();

    let completed = match outcome {
        Ok(ref result) => BulkCompleted::Success {
            duration: duration,
            result: result,
            operation: submission.operation,
            namespace: submission.namespace.to_owned(),
            request_id: submission.request_id,
        },
        Err(ref failure) => BulkCompleted::Failure {
            duration: duration,
            failure: failure,
            operation: submission.operation,
            namespace: submission.namespace.to_owned(),
            request_id: submission.request_id,
        },
    };

    debug!(target: "bulkop::bulk",
           request_id = submission.request_id,
           ok = outcome.is_ok(),
           duration_ns = completed.duration().as_nanos() as u64,
           "{}",
           completed);

    if let Err(err) = submission.listener.run_completion_hooks(&completed) {
        warn!(target: "bulkop::bulk", request_id = submission.request_id, error = %err,
              "completion hooks failed");
    }

    outcome
}
