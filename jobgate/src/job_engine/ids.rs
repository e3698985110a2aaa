// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::atomic::{AtomicU64, Ordering};

use crate::job_engine::job::JobId;

/// Issues job identities: 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> JobId {
        JobId::new(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The most recently issued raw id, 0 if none was issued yet.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}
