//! Transform module: eligibility filter plus the CPU-bound digest.
//!
//! Everything here is pure. No locks, no shared state, no logging: the
//! transform runs on every worker in parallel and must stay that way.

#![forbid(unsafe_code)]

use crate::record::Record;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use blake2::{Blake2s256, Digest};

/// Default minimum age for a record to be processed.
pub const DEFAULT_MIN_AGE: i32 = 18;

/// Default number of digest rounds per record.
pub const DEFAULT_ROUNDS: u64 = 9_000_000;

/// One processing step applied by a worker to each taken item.
///
/// Returning `None` drops the item.
pub trait Stage<T>: Send + Sync {
    fn process(&self, item: T) -> Option<T>;
}

impl<T, F> Stage<T> for F
where
    F: Fn(T) -> Option<T> + Send + Sync,
{
    fn process(&self, item: T) -> Option<T> {
        self(item)
    }
}

/// The record transform: filter by age, then digest the canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Records younger than this are dropped.
    pub min_age: i32,
    /// How many times the canonical bytes are fed to the hasher.
    pub rounds: u64,
}

impl Transform {
    pub fn new(min_age: i32, rounds: u64) -> Self {
        Self { min_age, rounds }
    }

    pub fn is_eligible(&self, record: &Record) -> bool {
        record.age >= self.min_age
    }

    /// Digest of the record's canonical bytes, URL-safe base64 encoded.
    pub fn digest(&self, record: &Record) -> String {
        let bytes = record.canonical_bytes();
        let mut hasher = Blake2s256::new();
        for _ in 0..self.rounds {
            hasher.update(&bytes);
        }
        URL_SAFE.encode(hasher.finalize())
    }

    /// Apply the transform: `None` for ineligible records, otherwise the
    /// record with `computed` filled in.
    pub fn apply(&self, mut record: Record) -> Option<Record> {
        if !self.is_eligible(&record) {
            return None;
        }
        record.computed = Some(self.digest(&record));
        Some(record)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AGE, DEFAULT_ROUNDS)
    }
}

impl Stage<Record> for Transform {
    fn process(&self, item: Record) -> Option<Record> {
        self.apply(item)
    }
}
