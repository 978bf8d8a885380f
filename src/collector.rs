//! Collector module: results kept sorted by key while workers insert concurrently.

#![forbid(unsafe_code)]

use crate::invariant_ppt::{assert_invariant_rt_safe, COLLECTOR_SORTED};
use crate::record::Keyed;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A thread-safe sequence that stays sorted ascending by [`Keyed::key`].
#[derive(Debug)]
pub struct SortedCollector<T> {
    items: Mutex<Vec<T>>,
}

impl<T: Keyed> SortedCollector<T> {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `item` before the first element whose key is `>=` its own.
    ///
    /// Linear scan plus shift: O(n) per insert under the lock.
    pub fn insert(&self, item: T) {
        let mut items = self.lock();
        let pos = items
            .iter()
            .position(|existing| existing.key() >= item.key())
            .unwrap_or(items.len());
        items.insert(pos, item);

        let sorted_here = (pos == 0 || items[pos - 1].key() <= items[pos].key())
            && items
                .get(pos + 1)
                .map_or(true, |next| items[pos].key() <= next.key());
        assert_invariant_rt_safe(
            COLLECTOR_SORTED,
            sorted_here,
            "collector stays non-decreasing by key",
        );
    }

    /// Number of collected items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the collector, yielding the sorted items.
    pub fn into_inner(self) -> Vec<T> {
        self.items
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Keyed + Clone> SortedCollector<T> {
    /// Copy of the full ordered sequence.
    ///
    /// Meant to be called once every producer has finished; a read racing
    /// with inserts sees some prefix of them.
    pub fn read(&self) -> Vec<T> {
        self.lock().clone()
    }
}

impl<T: Keyed> Default for SortedCollector<T> {
    fn default() -> Self {
        Self::new()
    }
}
