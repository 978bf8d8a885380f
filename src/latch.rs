//! Countdown latch used as the batch completion barrier.

#![forbid(unsafe_code)]

use crate::invariant_ppt::{assert_invariant_rt_safe, LATCH_NO_UNDERFLOW};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Blocks waiters until it has been counted down to zero.
///
/// Unlike `std::sync::Barrier`, the threads that count down never wait;
/// only the controller does.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            zero: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one finished unit of work.
    pub fn count_down(&self) {
        let mut remaining = self.lock();
        assert_invariant_rt_safe(
            LATCH_NO_UNDERFLOW,
            *remaining > 0,
            "latch counted down more times than it was armed for",
        );
        *remaining -= 1;
        if *remaining == 0 {
            self.zero.notify_all();
        }
    }

    /// Units of work still outstanding.
    pub fn remaining(&self) -> usize {
        *self.lock()
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.lock();
        while *remaining > 0 {
            remaining = self
                .zero
                .wait(remaining)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Block until the count reaches zero or `timeout` elapses.
    ///
    /// Returns `true` if the latch opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.lock();
        while *remaining > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            remaining = self
                .zero
                .wait_timeout(remaining, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn latch_zero_is_open() {
        let latch = CompletionLatch::new(0);
        latch.wait();
        assert!(latch.wait_timeout(Duration::ZERO));
    }

    #[test]
    fn latch_opens_after_all_count_downs() {
        let latch = Arc::new(CompletionLatch::new(8));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let latch = Arc::clone(&latch);
                thread::spawn(move || {
                    latch.count_down();
                    latch.count_down();
                })
            })
            .collect();
        latch.wait();
        assert_eq!(latch.remaining(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn latch_times_out_while_armed() {
        let latch = CompletionLatch::new(2);
        latch.count_down();
        assert!(!latch.wait_timeout(Duration::from_millis(20)));
        assert_eq!(latch.remaining(), 1);
    }

    #[test]
    #[should_panic(expected = "latch counted down")]
    fn latch_underflow_is_a_violation() {
        let latch = CompletionLatch::new(1);
        latch.count_down();
        latch.count_down();
    }
}
