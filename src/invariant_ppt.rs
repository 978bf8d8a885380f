//! PPT Invariant System: runtime invariant enforcement with contract tracking.
//!
//! Invariants are asserted where they must hold. With the `ppt` feature every
//! passing assertion is recorded, so a contract test can prove the invariant was
//! exercised and not merely never violated.
//!
//! Two tiers:
//! - [`assert_invariant_rt_safe`] is called inside per-instance critical
//!   sections (queue, collector, latch). It never locks: a passing check sets
//!   one bit in a static atomic mask.
//! - `assert_invariant` records into a `Mutex`-guarded log and is only called
//!   where no other lock is held.

#[cfg(feature = "ppt")]
use lazy_static::lazy_static;
#[cfg(feature = "ppt")]
use std::collections::HashSet;
#[cfg(feature = "ppt")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "ppt")]
use std::sync::{Mutex, PoisonError};

// Invariant constants for contract tracking.
pub const QUEUE_BOUNDS: u32 = 1;
pub const QUEUE_INDEX_VALID: u32 = 2;
pub const QUEUE_CLOSED_DRAIN: u32 = 3;
pub const COLLECTOR_SORTED: u32 = 4;
pub const LATCH_NO_UNDERFLOW: u32 = 5;
pub const POOL_ITEM_ACCOUNTED: u32 = 6;
pub const ELIGIBILITY_FILTER: u32 = 7;
pub const BATCH_COMPLETENESS: u32 = 8;

#[cfg(feature = "ppt")]
lazy_static! {
    static ref INVARIANT_LOG: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

/// Lock-free record of invariants signalled from hot paths, one bit per id.
#[cfg(feature = "ppt")]
static RT_SIGNALS: AtomicU64 = AtomicU64::new(0);

#[cfg(feature = "ppt")]
fn signal_bit(id: u32) -> Option<u64> {
    1u64.checked_shl(id)
}

/// Hot-path assertion: panics on failure, otherwise signals `id` without locking.
///
/// Safe to call while holding a structure's own lock. Ids must be below 64 to
/// be tracked.
#[inline]
pub(crate) fn assert_invariant_rt_safe(id: u32, condition: bool, message: &'static str) {
    if !condition {
        panic!("Invariant {} failed: {}", id, message);
    }
    #[cfg(feature = "ppt")]
    if let Some(bit) = signal_bit(id) {
        RT_SIGNALS.fetch_or(bit, Ordering::Relaxed);
    }
}

#[cfg(feature = "ppt")]
/// Assert an invariant: logs it and panics on failure.
pub(crate) fn assert_invariant(id: u32, condition: bool, message: &str, context: Option<&str>) {
    if !condition {
        let full_message = if let Some(ctx) = context {
            format!("Invariant {} failed: {} (context: {})", id, message, ctx)
        } else {
            format!("Invariant {} failed: {}", id, message)
        };
        tracing::error!(invariant = id, "{}", full_message);
        panic!("{}", full_message);
    }
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id);
}

#[cfg(not(feature = "ppt"))]
/// Assert an invariant: checks condition and panics on failure.
pub(crate) fn assert_invariant(_id: u32, condition: bool, message: &str, _context: Option<&str>) {
    if !condition {
        panic!("Invariant failed: {}", message);
    }
}

#[cfg(feature = "ppt")]
/// Contract test: checks that specified invariants were asserted.
pub fn contract_test(test_name: &str, required_invariants: &[u32]) {
    let signals = RT_SIGNALS.load(Ordering::Relaxed);
    let log = INVARIANT_LOG.lock().unwrap_or_else(PoisonError::into_inner);
    let missing: Vec<u32> = required_invariants
        .iter()
        .copied()
        .filter(|&inv| {
            let signalled = signal_bit(inv).is_some_and(|bit| signals & bit != 0);
            !signalled && !log.contains(&inv)
        })
        .collect();
    drop(log); // Drop the lock before panicking
    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed: invariants not enforced: {:?}",
            test_name, missing
        );
    }
}

#[cfg(not(feature = "ppt"))]
/// Contract test: no-op when PPT feature is disabled.
pub fn contract_test(_test_name: &str, _required_invariants: &[u32]) {}

#[cfg(feature = "ppt")]
/// Clear invariant log and hot-path signals (for between test runs).
pub fn clear_invariant_log() {
    RT_SIGNALS.store(0, Ordering::Relaxed);
    INVARIANT_LOG
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

#[cfg(not(feature = "ppt"))]
/// Clear invariant log: no-op when PPT feature is disabled.
pub fn clear_invariant_log() {}

/// Maps invariant ID to human-readable name (for diagnostics only).
pub const fn invariant_name(id: u32) -> &'static str {
    match id {
        QUEUE_BOUNDS => "QUEUE_BOUNDS",
        QUEUE_INDEX_VALID => "QUEUE_INDEX_VALID",
        QUEUE_CLOSED_DRAIN => "QUEUE_CLOSED_DRAIN",
        COLLECTOR_SORTED => "COLLECTOR_SORTED",
        LATCH_NO_UNDERFLOW => "LATCH_NO_UNDERFLOW",
        POOL_ITEM_ACCOUNTED => "POOL_ITEM_ACCOUNTED",
        ELIGIBILITY_FILTER => "ELIGIBILITY_FILTER",
        BATCH_COMPLETENESS => "BATCH_COMPLETENESS",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_invariant_pass() {
        assert_invariant(0, 1 + 1 == 2, "Math works", Some("basic"));
        // Should not panic
    }

    #[test]
    #[should_panic]
    fn test_assert_invariant_fail() {
        assert_invariant(0, 1 + 1 == 3, "Math broken", None);
    }

    #[test]
    fn test_contract_test() {
        #[cfg(feature = "ppt")]
        {
            assert_invariant(BATCH_COMPLETENESS, true, "recorded", Some("test_contract_test"));
            contract_test("example", &[BATCH_COMPLETENESS]);
        }

        #[cfg(not(feature = "ppt"))]
        {
            // When PPT is disabled, contract tests are a no-op.
            contract_test("example", &[BATCH_COMPLETENESS]);
        }
    }

    #[test]
    #[cfg(feature = "ppt")]
    #[should_panic(expected = "invariants not enforced")]
    fn test_contract_reports_missing() {
        contract_test("never asserted", &[u32::MAX]);
    }

    #[test]
    #[should_panic(expected = "Invariant 1 failed")]
    fn test_rt_safe_assert_fail() {
        assert_invariant_rt_safe(QUEUE_BOUNDS, false, "size out of range");
    }

    #[test]
    #[cfg(feature = "ppt")]
    fn test_rt_safe_assert_satisfies_contract() {
        assert_invariant_rt_safe(COLLECTOR_SORTED, true, "sorted");
        contract_test("rt signal", &[COLLECTOR_SORTED]);
    }

    /// Holding the global log must not stall any per-instance critical section.
    #[test]
    #[cfg(feature = "ppt")]
    fn test_hot_paths_ignore_held_log() {
        use crate::collector::SortedCollector;
        use crate::latch::CompletionLatch;
        use crate::queue::BoundedQueue;
        use crate::record::Record;
        use std::sync::mpsc;
        use std::time::Duration;

        let guard = INVARIANT_LOG.lock().unwrap_or_else(PoisonError::into_inner);
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let queue = BoundedQueue::new(1).unwrap();
            queue.put(Record::new("Bob", 30, 1.0)).unwrap();
            let record = queue.take().unwrap();
            queue.close();
            assert!(queue.take().is_none());

            let collector = SortedCollector::new();
            collector.insert(record);

            let latch = CompletionLatch::new(1);
            latch.count_down();
            let _ = tx.send(collector.len() + queue.len() + latch.remaining());
        });
        let result = rx.recv_timeout(Duration::from_secs(5));
        drop(guard);
        assert_eq!(result, Ok(1));
    }

    #[test]
    fn test_invariant_names() {
        assert_eq!(invariant_name(QUEUE_BOUNDS), "QUEUE_BOUNDS");
        assert_eq!(invariant_name(COLLECTOR_SORTED), "COLLECTOR_SORTED");
        assert_eq!(invariant_name(255), "UNKNOWN");
    }
}
