// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

pub mod cli;
pub mod csv_job;
pub mod print_job;
