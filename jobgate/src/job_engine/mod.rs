// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Bounded-Concurrency Job Dispatcher
//!
//! ## Overview
//! Callers submit jobs, at most N of them execute at the same time, the rest
//! wait in submission order and are started as slots free up.
//!
//! - The registry holds every admitted job that has not finished yet.
//! - The gate hands out at most N slot permits; check and take is one step.
//! - Every submission and every completion triggers the scheduler, which keeps
//!   claiming the oldest queued job while a permit can be taken.
//! - The completion tracker counts admitted jobs so callers can wait for all.
//! - Jobs run either on a pool of N worker threads (default) or on the thread
//!   that triggered the scheduler.
//!
//! ```text
//!   submit ──> registry.admit ──> trigger
//!                                    │
//!                     ┌──────────────┴─────────────┐
//!                     v                            v
//!              inline: drain()          workers: wake signal ──> drain()
//!                     │                            │
//!                     └──────────────┬─────────────┘
//!                                    v
//!        loop { gate.try_acquire ─> registry.claim_next ─> run job
//!               ─> registry.finish ─> release permit ─> tracker.leave }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod closure_job;
pub mod dispatcher;
mod engine;
pub mod gate;
pub mod ids;
pub mod job;
pub mod registry;
pub mod tracker;

/// Jobs run outside of every lock and panics are caught, so a poisoned lock
/// still holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
