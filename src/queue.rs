//! Queue module: fixed-capacity blocking FIFO shared by producers and workers.
//!
//! The whole buffer state sits behind one `Mutex`. Two condition variables
//! park threads while the ring is full (`not_full`) or empty (`not_empty`);
//! every wake-up re-checks its condition in a loop, since a notified thread
//! may find the slot already taken by another waiter.

#![forbid(unsafe_code)]

use crate::error::{Error, Result};
use crate::invariant_ppt::{
    assert_invariant_rt_safe, QUEUE_BOUNDS, QUEUE_CLOSED_DRAIN, QUEUE_INDEX_VALID,
};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Returned by [`BoundedQueue::put`] when the queue was closed; hands the item back.
#[derive(Debug, PartialEq, Eq)]
pub struct Closed<T>(pub T);

impl<T> From<Closed<T>> for Error {
    fn from(_: Closed<T>) -> Self {
        Error::QueueClosed
    }
}

#[derive(Debug)]
struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    size: usize,
    closed: bool,
}

impl<T> Ring<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    // Runs under the ring lock, so only the lock-free assertion tier is used.
    fn check(&self) {
        assert_invariant_rt_safe(
            QUEUE_BOUNDS,
            self.size <= self.capacity(),
            "queue size within [0, capacity]",
        );
        assert_invariant_rt_safe(
            QUEUE_INDEX_VALID,
            self.head < self.capacity() && self.tail < self.capacity(),
            "head and tail index the backing storage",
        );
    }
}

/// A bounded multi-producer multi-consumer blocking queue backed by a ring buffer.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    ring: Mutex<Ring<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Config("queue capacity must be at least 1".into()));
        }
        let slots = (0..capacity).map(|_| None).collect();
        Ok(Self {
            ring: Mutex::new(Ring {
                slots,
                head: 0,
                tail: 0,
                size: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        // Ring updates never panic midway, so a poisoned guard is still consistent.
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert at the tail, blocking while the queue is full.
    ///
    /// Fails only if the queue is (or becomes) closed, returning the item.
    pub fn put(&self, item: T) -> std::result::Result<(), Closed<T>> {
        let mut ring = self.lock();
        while ring.size == ring.capacity() && !ring.closed {
            ring = self
                .not_full
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if ring.closed {
            return Err(Closed(item));
        }

        let tail = ring.tail;
        ring.slots[tail] = Some(item);
        ring.tail = (tail + 1) % ring.capacity();
        ring.size += 1;
        ring.check();
        drop(ring);

        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove from the head, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed and fully drained; an
    /// open queue that is never fed blocks forever.
    pub fn take(&self) -> Option<T> {
        let mut ring = self.lock();
        while ring.size == 0 {
            if ring.closed {
                assert_invariant_rt_safe(
                    QUEUE_CLOSED_DRAIN,
                    ring.slots.iter().all(Option::is_none),
                    "closed queue reports end only after draining",
                );
                return None;
            }
            ring = self
                .not_empty
                .wait(ring)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let head = ring.head;
        let item = ring.slots[head].take();
        ring.head = (head + 1) % ring.capacity();
        ring.size -= 1;
        ring.check();
        drop(ring);

        self.not_full.notify_one();
        item
    }

    /// Close the queue and wake every waiter.
    ///
    /// Items already queued are still handed out by [`take`](Self::take).
    pub fn close(&self) {
        self.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.lock().size
    }

    /// Whether no items are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}
