//! Pool module: fixed set of worker threads draining a [`BoundedQueue`].
//!
//! Each worker loops take → stage → insert → signal. The pool does not count
//! work itself; the caller arms a [`CompletionLatch`](crate::latch::CompletionLatch)
//! (or any other counter) and counts it down from `on_item_done`, which fires
//! exactly once per taken item whether or not the stage produced a result.

use crate::collector::SortedCollector;
use crate::error::{Error, Result};
use crate::invariant_ppt::{assert_invariant, POOL_ITEM_ACCOUNTED};
use crate::queue::BoundedQueue;
use crate::record::Keyed;
use crate::transform::Stage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Handle to a running set of workers.
///
/// Dropping the handle closes the queue so parked workers exit; use
/// [`shutdown`](Self::shutdown) to also wait for them.
#[derive(Debug)]
pub struct WorkerPool<T> {
    queue: Arc<BoundedQueue<T>>,
    workers: Vec<JoinHandle<usize>>,
}

impl<T> WorkerPool<T>
where
    T: Keyed + Send + 'static,
{
    /// Spawn `n` workers sharing `queue`, `collector` and `stage`.
    pub fn start<S, F>(
        n: usize,
        queue: Arc<BoundedQueue<T>>,
        collector: Arc<SortedCollector<T>>,
        stage: S,
        on_item_done: F,
    ) -> Result<Self>
    where
        S: Stage<T> + 'static,
        F: Fn() + Send + Sync + 'static,
    {
        if n == 0 {
            return Err(Error::Config("worker count must be at least 1".into()));
        }

        let stage = Arc::new(stage);
        let on_item_done = Arc::new(on_item_done);
        let mut pool = Self {
            queue: Arc::clone(&queue),
            workers: Vec::with_capacity(n),
        };

        for index in 0..n {
            let worker = Worker {
                index,
                queue: Arc::clone(&queue),
                collector: Arc::clone(&collector),
                stage: Arc::clone(&stage),
                on_item_done: Arc::clone(&on_item_done),
            };
            let handle = thread::Builder::new()
                .name(format!("sortpool-worker-{index}"))
                .spawn(move || worker.run())
                .map_err(|source| Error::Spawn { index, source })?;
            pool.workers.push(handle);
        }

        debug!(workers = n, capacity = queue.capacity(), "worker pool started");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue and join every worker.
    ///
    /// Items still queued are processed before the workers exit. Returns the
    /// total number of items the workers took over their lifetime.
    pub fn shutdown(mut self) -> usize {
        self.queue.close();
        let mut taken = 0;
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(count) => taken += count,
                Err(_) => warn!("worker thread terminated by panic"),
            }
        }
        taken
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.queue.close();
        }
    }
}

struct Worker<T, S, F> {
    index: usize,
    queue: Arc<BoundedQueue<T>>,
    collector: Arc<SortedCollector<T>>,
    stage: Arc<S>,
    on_item_done: Arc<F>,
}

impl<T, S, F> Worker<T, S, F>
where
    T: Keyed,
    S: Stage<T>,
    F: Fn(),
{
    /// Worker loop; returns how many items this worker took.
    fn run(self) -> usize {
        debug!(worker = self.index, "worker started");
        let mut taken = 0usize;
        let mut signalled = 0usize;

        while let Some(item) = self.queue.take() {
            taken += 1;
            // A panicking stage must not starve the completion barrier.
            match catch_unwind(AssertUnwindSafe(|| self.stage.process(item))) {
                Ok(Some(result)) => self.collector.insert(result),
                Ok(None) => {}
                Err(_) => error!(worker = self.index, "stage panicked; item dropped"),
            }
            (self.on_item_done)();
            signalled += 1;
        }

        assert_invariant(
            POOL_ITEM_ACCOUNTED,
            taken == signalled,
            "every taken item signals completion exactly once",
            Some("worker exit"),
        );
        debug!(worker = self.index, taken, "worker stopped");
        taken
    }
}
