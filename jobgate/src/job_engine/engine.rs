// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_channel::{Receiver, Sender, TrySendError};
use log::{debug, error, info};

use crate::job_engine::gate::{Gate, SlotPermit};
use crate::job_engine::ids::IdGenerator;
use crate::job_engine::job::{Job, JobId};
use crate::job_engine::registry::Registry;
use crate::job_engine::tracker::CompletionTracker;
use crate::stats::Stats;

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    cancelled: AtomicU64,
    panicked: AtomicU64,
}

/// State shared between the dispatcher handle and the threads executing jobs:
/// the scheduler and the execution engine.
#[derive(Debug)]
pub(crate) struct Engine<J> {
    ids: IdGenerator,
    registry: Registry<J>,
    gate: Gate,
    tracker: CompletionTracker,
    counters: Counters,
    /// Wakes the worker pool. `None` means jobs run on the triggering thread.
    wake: Option<Sender<()>>,
    closing: AtomicBool,
}

impl<J: Job> Engine<J> {
    pub(crate) fn new(max_concurrency: usize, wake: Option<Sender<()>>) -> Self {
        Self {
            ids: IdGenerator::new(),
            registry: Registry::new(),
            gate: Gate::new(max_concurrency),
            tracker: CompletionTracker::new(),
            counters: Counters::default(),
            wake,
            closing: AtomicBool::new(false),
        }
    }

    pub(crate) fn registry(&self) -> &Registry<J> {
        &self.registry
    }

    pub(crate) fn gate(&self) -> &Gate {
        &self.gate
    }

    pub(crate) fn tracker(&self) -> &CompletionTracker {
        &self.tracker
    }

    pub(crate) fn submit(&self, payload: J) -> JobId {
        // enter before the job becomes visible, a worker may finish it right away
        self.tracker.enter();
        let desc = payload.desc().to_string();
        let id = self.registry.admit(&self.ids, payload);
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        debug!("Admitted job {id} ({desc})");
        self.trigger();
        id
    }

    pub(crate) fn cancel(&self, id: JobId) -> Option<J> {
        let payload = self.registry.remove_by_id(id)?;
        self.counters.cancelled.fetch_add(1, Ordering::Relaxed);
        self.tracker.leave();
        debug!("Cancelled job {id} ({})", payload.desc());
        Some(payload)
    }

    /// Scheduler entry point: makes sure a free slot gets used.
    pub(crate) fn trigger(&self) {
        if !self.gate.has_free_slot() {
            // whoever holds a slot drains again after releasing it
            return;
        }
        match &self.wake {
            None => self.drain(),
            Some(wake) => match wake.try_send(()) {
                // enough wakes are pending to occupy every worker
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Closed(())) => {
                    debug!("Worker pool is closed, job stays queued");
                }
            },
        }
    }

    /// Runs eligible jobs, oldest first, as long as slots are free.
    pub(crate) fn drain(&self) {
        loop {
            if self.closing.load(Ordering::SeqCst) {
                return;
            }
            // a job admitted while we held a slot saw no free slot and
            // relies on this check after the slot was released
            if !self.registry.has_eligible() {
                return;
            }
            let Some(permit) = self.gate.try_acquire() else {
                return;
            };
            // another thread may have claimed it in between
            if let Some((id, payload)) = self.registry.claim_next() {
                self.execute(permit, id, payload);
            }
        }
    }

    /// Runs one specific job on the calling thread, then drains.
    ///
    /// Returns `false` if the job was not started by this call: no slot was
    /// free, or the job is unknown or already running.
    pub(crate) fn run(&self, id: JobId) -> bool {
        if self.closing.load(Ordering::SeqCst) {
            return false;
        }
        let Some(permit) = self.gate.try_acquire() else {
            return false;
        };
        let Some(payload) = self.registry.claim(id) else {
            drop(permit);
            self.drain();
            return false;
        };
        self.execute(permit, id, payload);
        self.drain();
        true
    }

    fn execute(&self, permit: SlotPermit<'_>, id: JobId, mut payload: J) {
        debug!("Executing job {id} ({})", payload.desc());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| payload.run()));
        match outcome {
            Ok(()) => {
                self.counters.completed.fetch_add(1, Ordering::Relaxed);
                debug!("Finished job {id} ({})", payload.desc());
            }
            Err(_) => {
                self.counters.panicked.fetch_add(1, Ordering::Relaxed);
                error!("Job {id} ({}) panicked", payload.desc());
            }
        }
        drop(payload);

        // this order makes wait_all observe an empty registry and an idle gate
        self.registry.finish(id);
        drop(permit);
        self.tracker.leave();
    }

    /// Stops claiming new work and lets idle workers exit.
    pub(crate) fn close(&self) {
        self.closing.store(true, Ordering::SeqCst);
        if let Some(wake) = &self.wake {
            wake.close();
        }
    }

    /// Drops everything still queued after [`Engine::close`].
    pub(crate) fn discard_queued(&self) -> usize {
        let discarded = self.registry.discard_queued();
        for _ in 0..discarded {
            self.tracker.leave();
        }
        discarded
    }

    pub(crate) fn stats(&self) -> Stats {
        let (pending, running) = self.registry.counts();
        Stats {
            max_concurrency: self.gate.max(),
            pending,
            queued: pending - running,
            running,
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            cancelled: self.counters.cancelled.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
        }
    }
}

/// Body of one pool thread: drain whenever woken, exit once the channel closes.
pub(crate) fn worker_loop<J: Job>(engine: &Engine<J>, wake: Receiver<()>, index: usize) {
    info!("Starting worker {index}");
    while wake.recv_blocking().is_ok() {
        engine.drain();
    }
    info!("Worker {index} stopped, channel closed");
}
