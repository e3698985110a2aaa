// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts executing jobs against a fixed maximum.
///
/// Checking for a free slot and taking it is one compare-and-swap, so two
/// threads that both see the last free slot cannot both enter.
#[derive(Debug)]
pub struct Gate {
    running: AtomicUsize,
    max: usize,
}

impl Gate {
    /// A gate with `max` slots. Zero is raised to one.
    pub fn new(max: usize) -> Self {
        Self {
            running: AtomicUsize::new(0),
            max: max.max(1),
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub fn has_free_slot(&self) -> bool {
        self.running() < self.max
    }

    /// Takes a slot if one is free. The slot is given back when the permit
    /// is dropped.
    pub fn try_acquire(&self) -> Option<SlotPermit<'_>> {
        self.running
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |running| {
                (running < self.max).then_some(running + 1)
            })
            .ok()
            .map(|_| SlotPermit { gate: self })
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One taken slot of a [`Gate`].
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct SlotPermit<'a> {
    gate: &'a Gate,
}

impl Drop for SlotPermit<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
