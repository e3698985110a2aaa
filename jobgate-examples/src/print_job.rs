// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::thread::sleep;
use std::time::Duration;

use jobgate::Job;

/// Prints its name a few times, pausing one tick after each line.
#[derive(Debug, Clone)]
pub struct PrintJob {
    name: String,
    repeat: u32,
    tick: Duration,
}

impl PrintJob {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repeat: 5,
            tick: Duration::from_secs(1),
        }
    }

    pub fn repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
}

impl Job for PrintJob {
    fn run(&mut self) {
        for i in 0..self.repeat {
            println!("{} {}", i, self.name);
            sleep(self.tick);
        }
    }

    fn desc(&self) -> &str {
        &self.name
    }
}
