// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use jobgate::Job;

/// When and where one job body ran.
#[derive(Debug, Clone)]
pub struct Span {
    pub name: String,
    pub thread: ThreadId,
    pub start: Instant,
    pub end: Option<Instant>,
}

/// Collects the spans of every job body that reports to it.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    spans: Arc<Mutex<Vec<Span>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, name: &str) -> usize {
        let mut spans = self.spans.lock().unwrap();
        spans.push(Span {
            name: name.to_string(),
            thread: thread::current().id(),
            start: Instant::now(),
            end: None,
        });
        spans.len() - 1
    }

    pub fn finish(&self, index: usize) {
        self.spans.lock().unwrap()[index].end = Some(Instant::now());
    }

    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().unwrap().clone()
    }

    /// Job names in the order their bodies started.
    pub fn started_order(&self) -> Vec<String> {
        self.spans().into_iter().map(|span| span.name).collect()
    }

    /// Largest number of bodies that were running at the same instant.
    pub fn max_overlap(&self) -> usize {
        let mut events: Vec<(Instant, i32)> = Vec::new();
        for span in self.spans() {
            events.push((span.start, 1));
            events.push((span.end.unwrap_or_else(Instant::now), -1));
        }
        // ends sort before starts at the same instant
        events.sort();

        let mut active = 0;
        let mut peak = 0;
        for (_, delta) in events {
            active += delta;
            peak = peak.max(active);
        }
        peak as usize
    }

    /// A job that sleeps for `work` and reports its span here.
    pub fn sleeper(&self, name: impl Into<String>, work: Duration) -> RecordedJob {
        RecordedJob {
            name: name.into(),
            work,
            recorder: self.clone(),
        }
    }
}

pub struct RecordedJob {
    name: String,
    work: Duration,
    recorder: Recorder,
}

impl Job for RecordedJob {
    fn run(&mut self) {
        let span = self.recorder.start(&self.name);
        if !self.work.is_zero() {
            thread::sleep(self.work);
        }
        self.recorder.finish(span);
    }

    fn desc(&self) -> &str {
        &self.name
    }
}
