// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Condvar, Mutex};

use jobgate::Job;

use crate::recorder::Recorder;

#[derive(Clone, Debug, Copy, PartialOrd, PartialEq)]
pub enum State {
    Initialized,
    Started,
    Released,
    Finished,
}

type SyncState = Arc<(Mutex<State>, Condvar)>;

fn set_state(sync_state: &SyncState, new_state: State) {
    let (lock, cvar) = &**sync_state;
    let mut current_state = lock.lock().unwrap();
    *current_state = new_state;
    cvar.notify_all();
}

/// A job that keeps its slot until the test releases it.
pub struct HeldJob {
    name: String,
    recorder: Recorder,
    sync_state: SyncState,
}

/// The test's side of a [`HeldJob`].
#[derive(Clone, Debug)]
pub struct HoldHandle {
    sync_state: SyncState,
}

impl HeldJob {
    pub fn new(name: impl Into<String>, recorder: &Recorder) -> (Self, HoldHandle) {
        let sync_state = Arc::new((Mutex::new(State::Initialized), Condvar::new()));
        let job = Self {
            name: name.into(),
            recorder: recorder.clone(),
            sync_state: sync_state.clone(),
        };
        (job, HoldHandle { sync_state })
    }
}

impl Job for HeldJob {
    fn run(&mut self) {
        let span = self.recorder.start(&self.name);
        set_state(&self.sync_state, State::Started);
        self.wait_until_released();
        self.recorder.finish(span);
        set_state(&self.sync_state, State::Finished);
    }

    fn desc(&self) -> &str {
        &self.name
    }
}

impl HeldJob {
    fn wait_until_released(&self) {
        let (lock, cvar) = &*self.sync_state;
        let mut current_state = lock.lock().unwrap();
        while *current_state < State::Released {
            current_state = cvar.wait(current_state).unwrap();
        }
    }
}

impl HoldHandle {
    pub fn state(&self) -> State {
        *self.sync_state.0.lock().unwrap()
    }

    /// Blocks until the job reached at least `state`.
    pub fn wait_for(&self, state: State) {
        // pattern is described on https://doc.rust-lang.org/stable/std/sync/struct.Condvar.html
        let (lock, cvar) = &*self.sync_state;
        let mut current_state = lock.lock().unwrap();
        while *current_state < state {
            current_state = cvar.wait(current_state).unwrap();
        }
    }

    pub fn release(&self) {
        set_state(&self.sync_state, State::Released);
    }
}
