// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::future::Future;
use std::pin::Pin;

use crate::job_engine::job::Job;

/// A job whose body is a closure.
pub struct ClosureJob {
    desc: String,
    body: Box<dyn FnMut() + Send + 'static>,
}

impl ClosureJob {
    pub fn new(desc: impl Into<String>, body: impl FnMut() + Send + 'static) -> Self {
        Self {
            desc: desc.into(),
            body: Box::new(body),
        }
    }
}

impl Job for ClosureJob {
    fn run(&mut self) {
        (self.body)()
    }

    fn desc(&self) -> &str {
        &self.desc
    }
}

type TaskCreator = Box<dyn FnMut() -> Pin<Box<dyn Future<Output = ()>>> + Send + 'static>;

/// A job whose body is async.
///
/// The executing thread creates the future and blocks on it until it
/// completes, so the future itself does not need to be `Send`.
pub struct FutureJob {
    desc: String,
    task_creator: TaskCreator,
}

impl FutureJob {
    pub fn new<F, Fut>(desc: impl Into<String>, mut task_creator: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        Self {
            desc: desc.into(),
            task_creator: Box::new(move || -> Pin<Box<dyn Future<Output = ()>>> {
                Box::pin(task_creator())
            }),
        }
    }
}

impl Job for FutureJob {
    fn run(&mut self) {
        let task = (self.task_creator)();
        futures::executor::block_on(task);
    }

    fn desc(&self) -> &str {
        &self.desc
    }
}
