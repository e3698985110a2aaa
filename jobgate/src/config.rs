// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use serde::{Deserialize, Serialize};

/// Where admitted jobs are executed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    #[default]
    /// Default: one worker thread per slot, `submit` only enqueues
    Workers,
    /// Run on the submitting thread. `submit` blocks while it executes the job
    /// and every job that becomes eligible behind it.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Maximum number of jobs executing at the same time. Zero means one.
    pub max_concurrency: usize,
    pub mode: ExecutionMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            mode: ExecutionMode::default(),
        }
    }
}

impl Config {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Accepts any signed count; non-positive values are raised to one.
    pub fn from_signed(max_concurrency: i64) -> Self {
        Self::new(usize::try_from(max_concurrency).unwrap_or(0))
    }

    /// The slot count actually used, also for hand-built or deserialized values.
    pub fn effective_max_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}
