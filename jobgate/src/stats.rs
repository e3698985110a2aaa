// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use serde::{Deserialize, Serialize};

/// Point-in-time view of a dispatcher.
///
/// The fields are read one after another without a common lock, so a snapshot
/// taken while jobs are moving may be slightly inconsistent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub max_concurrency: usize,
    /// Admitted and not yet finished or cancelled, running or not.
    pub pending: usize,
    /// Admitted and waiting for a slot.
    pub queued: usize,
    pub running: usize,
    pub submitted: u64,
    pub completed: u64,
    pub cancelled: u64,
    /// Jobs whose body panicked. They count as finished, not as completed.
    pub panicked: u64,
}

impl Stats {
    /// True when nothing is queued or running.
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.running == 0
    }

    /// Jobs that left the dispatcher, by any route.
    pub fn finished(&self) -> u64 {
        self.completed + self.cancelled + self.panicked
    }
}
