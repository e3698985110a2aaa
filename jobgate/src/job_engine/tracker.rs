// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::job_engine::lock;

/// Join counter over every admitted job.
///
/// A job enters when it is submitted and leaves once it has completed or was
/// cancelled. Waiters block until the counter drops back to zero.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: Mutex<usize>,
    drained: Condvar,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) {
        *lock(&self.outstanding) += 1;
    }

    pub fn leave(&self) {
        let mut outstanding = lock(&self.outstanding);
        debug_assert!(*outstanding > 0, "leave without a matching enter");
        *outstanding = outstanding.saturating_sub(1);
        if *outstanding == 0 {
            self.drained.notify_all();
        }
    }

    pub fn outstanding(&self) -> usize {
        *lock(&self.outstanding)
    }

    /// Blocks until nothing is outstanding. Returns at once if nothing ever was.
    pub fn wait_all(&self) {
        let outstanding = lock(&self.outstanding);
        let _drained = self
            .drained
            .wait_while(outstanding, |outstanding| *outstanding > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Like [`CompletionTracker::wait_all`], but gives up after `timeout`.
    /// Returns `true` if the counter reached zero.
    pub fn wait_all_timeout(&self, timeout: Duration) -> bool {
        let outstanding = lock(&self.outstanding);
        let (_drained, result) = self
            .drained
            .wait_timeout_while(outstanding, timeout, |outstanding| *outstanding > 0)
            .unwrap_or_else(PoisonError::into_inner);
        !result.timed_out()
    }
}
