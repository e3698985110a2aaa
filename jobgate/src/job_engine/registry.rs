// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::collections::VecDeque;
use std::mem;
use std::sync::Mutex;

use crate::job_engine::ids::IdGenerator;
use crate::job_engine::job::JobId;
use crate::job_engine::lock;

/// What the registry holds for an admitted job.
#[derive(Debug)]
enum EntryState<J> {
    /// Waiting for a slot. The registry owns the payload.
    Queued(J),
    /// The payload has been handed to an executing thread.
    Running,
}

#[derive(Debug)]
struct QueueEntry<J> {
    id: JobId,
    state: EntryState<J>,
}

impl<J> QueueEntry<J> {
    fn is_running(&self) -> bool {
        matches!(self.state, EntryState::Running)
    }

    fn take_payload(&mut self) -> Option<J> {
        match mem::replace(&mut self.state, EntryState::Running) {
            EntryState::Queued(payload) => Some(payload),
            EntryState::Running => None,
        }
    }
}

/// Admitted but not yet finished jobs, in submission order.
///
/// Ids are issued while the registry lock is held, so the entries are always
/// sorted by id and lookups can binary search.
#[derive(Debug)]
pub struct Registry<J> {
    entries: Mutex<VecDeque<QueueEntry<J>>>,
}

impl<J> Default for Registry<J> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
        }
    }
}

impl<J> Registry<J> {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(entries: &VecDeque<QueueEntry<J>>, id: JobId) -> Option<usize> {
        entries.binary_search_by_key(&id, |entry| entry.id).ok()
    }

    /// Issues a new id and appends a queued entry at the tail.
    pub fn admit(&self, ids: &IdGenerator, payload: J) -> JobId {
        let mut entries = lock(&self.entries);
        let id = ids.next();
        entries.push_back(QueueEntry {
            id,
            state: EntryState::Queued(payload),
        });
        id
    }

    /// Removes a queued entry and hands back its payload.
    ///
    /// Returns `None` for unknown ids and for running entries; the latter are
    /// removed by [`Registry::finish`] once their body returns.
    pub fn remove_by_id(&self, id: JobId) -> Option<J> {
        let mut entries = lock(&self.entries);
        let index = Self::position(&entries, id)?;
        if entries[index].is_running() {
            return None;
        }
        entries
            .remove(index)
            .and_then(|mut entry| entry.take_payload())
    }

    /// Oldest entry that is not running.
    pub fn find_next_eligible(&self) -> Option<JobId> {
        lock(&self.entries)
            .iter()
            .find(|entry| !entry.is_running())
            .map(|entry| entry.id)
    }

    /// Marks the given entry running and takes its payload.
    ///
    /// `None` if the id is unknown or already running.
    pub fn claim(&self, id: JobId) -> Option<J> {
        let mut entries = lock(&self.entries);
        let index = Self::position(&entries, id)?;
        entries[index].take_payload()
    }

    /// Marks the oldest queued entry running and takes its payload.
    pub fn claim_next(&self) -> Option<(JobId, J)> {
        let mut entries = lock(&self.entries);
        let entry = entries.iter_mut().find(|entry| !entry.is_running())?;
        let id = entry.id;
        entry.take_payload().map(|payload| (id, payload))
    }

    /// Drops the entry of a job whose body has returned.
    ///
    /// Queued entries are left alone; returns whether something was removed.
    pub fn finish(&self, id: JobId) -> bool {
        let mut entries = lock(&self.entries);
        match Self::position(&entries, id) {
            Some(index) if entries[index].is_running() => entries.remove(index).is_some(),
            _ => false,
        }
    }

    /// Number of entries, running or not.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn queued_len(&self) -> usize {
        lock(&self.entries)
            .iter()
            .filter(|entry| !entry.is_running())
            .count()
    }

    /// Entries whose payload is checked out to an executing thread.
    pub fn running_len(&self) -> usize {
        self.counts().1
    }

    /// `(len, running)` read under one lock.
    pub fn counts(&self) -> (usize, usize) {
        let entries = lock(&self.entries);
        let running = entries.iter().filter(|entry| entry.is_running()).count();
        (entries.len(), running)
    }

    pub fn has_eligible(&self) -> bool {
        self.find_next_eligible().is_some()
    }

    /// Drops every queued payload, returning how many were discarded.
    pub(crate) fn discard_queued(&self) -> usize {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|entry| entry.is_running());
        before - entries.len()
    }
}
