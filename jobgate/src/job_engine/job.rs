// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fmt;

/// Identity of an admitted job.
///
/// Issued by the dispatcher at submission time, strictly increasing and never
/// reused for the lifetime of that dispatcher. The first id is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit of work the dispatcher can run.
///
/// The dispatcher never looks inside a job. It only calls [`Job::run`] once,
/// on whichever thread picked the job up, and drops the job afterwards.
pub trait Job: Send + 'static {
    /// Main entry point. Runs the job to completion.
    ///
    /// Failures are the job's own business: nothing is reported back to the
    /// submitter.
    fn run(&mut self);

    /// Free-form description, used for logging or debugging
    fn desc(&self) -> &str {
        "job"
    }
}

impl<J: Job + ?Sized> Job for Box<J> {
    fn run(&mut self) {
        (**self).run()
    }

    fn desc(&self) -> &str {
        (**self).desc()
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("desc", &self.desc()).finish()
    }
}
