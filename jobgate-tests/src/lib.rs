// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod held_job;
pub mod recorder;

/// Routes `log` output of the dispatcher into the test harness.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
