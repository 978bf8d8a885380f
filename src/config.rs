//! Configuration for batch runs.

use crate::error::{Error, Result};
use crate::transform::{Transform, DEFAULT_MIN_AGE, DEFAULT_ROUNDS};
use serde::Deserialize;
use std::path::Path;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 6;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 5;

/// Batch execution parameters.
///
/// Loadable from TOML; missing keys take their defaults:
///
/// ```toml
/// workers = 6
/// queue_capacity = 5
/// min_age = 18
/// rounds = 9000000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub workers: usize,
    pub queue_capacity: usize,
    pub min_age: i32,
    pub rounds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            min_age: DEFAULT_MIN_AGE,
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl Config {
    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&text).map_err(|source| Error::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_min_age(mut self, min_age: i32) -> Self {
        self.min_age = min_age;
        self
    }

    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.rounds = rounds;
        self
    }

    /// Reject values the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".into()));
        }
        if self.rounds == 0 {
            return Err(Error::Config("rounds must be at least 1".into()));
        }
        Ok(())
    }

    /// The transform described by this config.
    pub fn transform(&self) -> Transform {
        Transform::new(self.min_age, self.rounds)
    }
}
