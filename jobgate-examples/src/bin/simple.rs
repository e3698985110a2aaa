// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::time::Duration;

use clap::Parser;
use jobgate::Dispatcher;
use jobgate_examples::cli::{init_logging, DispatchArgs};
use jobgate_examples::print_job::PrintJob;
use log::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Runs named demo jobs through a bounded dispatcher")]
struct Args {
    /// Names of the jobs to submit, in order
    #[arg(default_values_t = vec!["test1".to_string(), "test2".to_string()])]
    names: Vec<String>,

    /// How often each job prints its name
    #[arg(long, default_value_t = 5)]
    repeat: u32,

    /// Pause after every printed line, in milliseconds
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,

    #[command(flatten)]
    dispatch: DispatchArgs,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let dispatcher = Dispatcher::new(args.dispatch.to_config()?);
    for name in &args.names {
        let job = PrintJob::new(name.as_str())
            .repeat(args.repeat)
            .tick(Duration::from_millis(args.tick_ms));
        let id = dispatcher.submit(job);
        info!("Submitted {name} as job {id}");
    }

    dispatcher.wait_all();
    args.dispatch.report(&dispatcher.stats())?;
    dispatcher.shutdown();
    Ok(())
}
