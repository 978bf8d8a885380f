//! Batch record processing on a fixed worker pool.
//!
//! Records flow through a [`BoundedQueue`] into a [`WorkerPool`]; each worker
//! applies a [`Transform`] and deposits results into a [`SortedCollector`],
//! which stays ordered by name no matter which worker finishes first. A
//! [`CompletionLatch`] tells the caller when every record has been handled.
//!
//! [`run_batch`] packages that protocol for one batch.

pub mod batch;
pub mod collector;
pub mod config;
pub mod error;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod latch;
pub mod loader;
pub mod pool;
pub mod queue;
pub mod record;
pub mod report;
pub mod transform;

pub use batch::{run_batch, BatchOutcome};
pub use collector::SortedCollector;
pub use config::Config;
pub use error::{Error, Result};
pub use latch::CompletionLatch;
pub use pool::WorkerPool;
pub use queue::{BoundedQueue, Closed};
pub use record::{Keyed, Record};
pub use transform::{Stage, Transform};
