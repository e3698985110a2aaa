// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{Config, ExecutionMode};
use crate::job_engine::engine::{worker_loop, Engine};
use crate::job_engine::job::{Job, JobId};
use crate::stats::Stats;

/// Admits at most `max_concurrency` jobs to run at once and queues the rest.
///
/// Queued jobs are started oldest first whenever a slot frees up. The
/// dispatcher is `Sync`; share it behind an `Arc` to submit from several
/// threads.
#[derive(Debug)]
pub struct Dispatcher<J: Job> {
    engine: Arc<Engine<J>>,
    mode: ExecutionMode,
    workers: Vec<JoinHandle<()>>,
}

impl<J: Job> Dispatcher<J> {
    pub fn new(config: Config) -> Self {
        let max_concurrency = config.effective_max_concurrency();

        let (engine, workers) = match config.mode {
            ExecutionMode::Inline => (Arc::new(Engine::new(max_concurrency, None)), Vec::new()),
            ExecutionMode::Workers => {
                let (tx, rx) = async_channel::bounded(max_concurrency);
                let engine = Arc::new(Engine::new(max_concurrency, Some(tx)));
                let workers = (0..max_concurrency)
                    .map(|index| {
                        let engine = engine.clone();
                        let rx = rx.clone();
                        thread::Builder::new()
                            .name(format!("jobgate-worker-{index}"))
                            .spawn(move || worker_loop(&engine, rx, index))
                            .expect("failed to spawn a dispatcher worker thread")
                    })
                    .collect();
                (engine, workers)
            }
        };

        info!(
            "Dispatcher ready: {} slot(s), {:?} execution",
            max_concurrency, config.mode
        );
        Self {
            engine,
            mode: config.mode,
            workers,
        }
    }

    /// Worker-pool dispatcher with the given number of slots.
    pub fn with_max_concurrency(max_concurrency: usize) -> Self {
        Self::new(Config::new(max_concurrency))
    }

    /// Admits a job and returns its id.
    ///
    /// Never rejects work. In [`ExecutionMode::Workers`] this only enqueues. In
    /// [`ExecutionMode::Inline`] with a free slot, the calling thread runs the
    /// job, and every job that becomes eligible after it, before returning.
    pub fn submit(&self, payload: J) -> JobId {
        self.engine.submit(payload)
    }

    /// Takes a queued job back out and returns it.
    ///
    /// `None` if the id is unknown, already finished or cancelled, or currently
    /// running. Running jobs are never interrupted.
    pub fn cancel(&self, id: JobId) -> Option<J> {
        self.engine.cancel(id)
    }

    /// Runs the given queued job on the calling thread if a slot is free,
    /// followed by whatever becomes eligible. Returns whether it was started.
    pub fn run_now(&self, id: JobId) -> bool {
        self.engine.run(id)
    }

    /// Admitted jobs not yet finished or cancelled, running or not.
    pub fn pending_count(&self) -> usize {
        self.engine.registry().len()
    }

    /// Admitted jobs still waiting for a slot.
    pub fn queued_count(&self) -> usize {
        self.engine.registry().queued_len()
    }

    /// Admitted jobs whose body is executing right now.
    pub fn running_count(&self) -> usize {
        self.engine.registry().running_len()
    }

    pub fn max_concurrency(&self) -> usize {
        self.engine.gate().max()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The job the scheduler would start next.
    pub fn next_eligible(&self) -> Option<JobId> {
        self.engine.registry().find_next_eligible()
    }

    /// Blocks until every admitted job has finished or was cancelled.
    pub fn wait_all(&self) {
        self.engine.tracker().wait_all();
    }

    /// Bounded [`Dispatcher::wait_all`]. Returns `false` on timeout.
    pub fn wait_all_timeout(&self, timeout: Duration) -> bool {
        self.engine.tracker().wait_all_timeout(timeout)
    }

    pub fn stats(&self) -> Stats {
        self.engine.stats()
    }

    /// Waits for all admitted work, then stops the workers.
    pub fn shutdown(self) {
        debug!("Waiting for admitted jobs before shutdown");
        self.wait_all();
        // Drop closes the channel and joins the workers
    }
}

impl<J: Job> Drop for Dispatcher<J> {
    fn drop(&mut self) {
        self.engine.close();

        // a job that owned the last handle would otherwise join itself
        let current = thread::current().id();
        for handle in self.workers.drain(..) {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("A dispatcher worker thread panicked");
            }
        }

        let discarded = self.engine.discard_queued();
        if discarded > 0 {
            info!("Discarded {discarded} queued job(s) on shutdown");
        }
        info!("Dispatcher stopped");
    }
}
