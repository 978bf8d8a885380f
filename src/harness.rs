//! Liveness harness: runs batches under a deadline so a hang shows up as a failure.

use crate::batch::{run_batch, BatchOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::record::Record;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Harness for liveness proofs: runs a batch on a watchdog thread.
pub struct BatchHarness {
    config: Config,
    deadline: Duration,
}

impl BatchHarness {
    /// Create harness from config.
    pub fn new(config: Config, deadline: Duration) -> Self {
        Self { config, deadline }
    }

    /// Run one batch; `None` means it did not finish before the deadline.
    ///
    /// A hung batch leaves its thread parked; the harness only reports it.
    pub fn run(&self, records: Vec<Record>) -> Option<Result<BatchOutcome>> {
        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();
        thread::spawn(move || {
            let _ = tx.send(run_batch(&records, &config));
        });
        rx.recv_timeout(self.deadline).ok()
    }
}
