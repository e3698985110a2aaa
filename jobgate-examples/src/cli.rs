// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use jobgate::{Config, ExecutionMode, Stats};

/// Where the demo jobs are executed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
#[clap(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    /// Default: a worker thread per slot, submitting never blocks
    Workers,
    /// The submitting thread runs the job if a slot is free
    Inline,
}

impl From<Mode> for ExecutionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Workers => ExecutionMode::Workers,
            Mode::Inline => ExecutionMode::Inline,
        }
    }
}

/// Dispatcher options shared by all demo programs.
#[derive(Debug, Parser)]
pub struct DispatchArgs {
    /// Maximum number of jobs executing at the same time (values below 1 mean 1)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub max_jobs: i64,

    /// Where jobs are executed
    #[arg(long, value_enum, default_value_t)]
    pub mode: Mode,

    /// Dispatcher configuration as JSON. Note that this excludes --max-jobs and --mode.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["max_jobs", "mode"])]
    pub config: Option<PathBuf>,

    /// Print the dispatcher statistics as JSON once all jobs are done
    #[arg(long)]
    pub stats: bool,
}

impl DispatchArgs {
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let Some(path) = &self.config else {
            return Ok(Config::from_signed(self.max_jobs).with_mode(self.mode.into()));
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid dispatcher config in {}", path.display()))?;
        Ok(config)
    }

    pub fn report(&self, stats: &Stats) -> anyhow::Result<()> {
        if self.stats {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        Ok(())
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
