// SPDX-License-Identifier: MIT
// jobgate: bounded-concurrency job dispatcher
//
// - Admits at most N jobs to run at the same time, queues the rest.
// - Starts queued jobs in submission order as soon as a slot frees up.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! Submit jobs, let at most N of them run at once, wait for all of them.
//!
//! ```
//! use jobgate::{ClosureJob, Dispatcher};
//!
//! let dispatcher = Dispatcher::with_max_concurrency(2);
//! let first = dispatcher.submit(ClosureJob::new("first", || println!("first")));
//! let second = dispatcher.submit(ClosureJob::new("second", || println!("second")));
//! assert!(first < second);
//!
//! dispatcher.wait_all();
//! assert_eq!(dispatcher.pending_count(), 0);
//! assert_eq!(dispatcher.running_count(), 0);
//! ```

pub mod config;
pub mod job_engine;
pub mod stats;

pub use config::{Config, ExecutionMode};
pub use job_engine::closure_job::{ClosureJob, FutureJob};
pub use job_engine::dispatcher::Dispatcher;
pub use job_engine::job::{Job, JobId};
pub use stats::Stats;
