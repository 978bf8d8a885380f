//! Batch driver: wires queue, collector, latch and pool together for one batch.

use crate::collector::SortedCollector;
use crate::config::Config;
use crate::error::Result;
use crate::invariant_ppt::{assert_invariant, BATCH_COMPLETENESS, ELIGIBILITY_FILTER};
use crate::latch::CompletionLatch;
use crate::pool::WorkerPool;
use crate::queue::BoundedQueue;
use crate::record::Record;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Output of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// Eligible records with `computed` set, sorted by name.
    pub results: Vec<Record>,
    /// Number of records taken and signalled by workers.
    pub processed: usize,
    /// Number of records the eligibility filter dropped.
    pub dropped: usize,
}

/// Process `records` through a fresh pool configured by `config`.
///
/// The pool is started before the queue is filled, so inputs larger than the
/// queue capacity never block the producer indefinitely. Returns once every
/// record has been signalled done and all workers have exited.
pub fn run_batch(records: &[Record], config: &Config) -> Result<BatchOutcome> {
    config.validate()?;
    let span = info_span!("batch", records = records.len(), workers = config.workers);
    let _enter = span.enter();
    let started = Instant::now();

    let queue = Arc::new(BoundedQueue::new(config.queue_capacity)?);
    let collector = Arc::new(SortedCollector::new());
    let latch = Arc::new(CompletionLatch::new(records.len()));
    let transform = config.transform();

    let pool = {
        let latch = Arc::clone(&latch);
        WorkerPool::start(
            config.workers,
            Arc::clone(&queue),
            Arc::clone(&collector),
            transform,
            move || latch.count_down(),
        )?
    };

    for record in records {
        queue.put(record.clone())?;
    }
    debug!("all records enqueued");

    latch.wait();
    let processed = pool.shutdown();

    let results = Arc::try_unwrap(collector)
        .map(SortedCollector::into_inner)
        .unwrap_or_else(|shared| shared.read());

    let eligible = records.iter().filter(|r| transform.is_eligible(r)).count();
    assert_invariant(
        BATCH_COMPLETENESS,
        processed == records.len() && results.len() == eligible,
        "every record processed once and every eligible record collected",
        Some("run_batch"),
    );
    assert_invariant(
        ELIGIBILITY_FILTER,
        results
            .iter()
            .all(|r| transform.is_eligible(r) && r.computed.is_some()),
        "only eligible records are collected, each with a computed value",
        Some("run_batch"),
    );

    let outcome = BatchOutcome {
        dropped: records.len() - results.len(),
        results,
        processed,
    };
    info!(
        processed = outcome.processed,
        kept = outcome.results.len(),
        dropped = outcome.dropped,
        elapsed = ?started.elapsed(),
        "batch finished"
    );
    Ok(outcome)
}
