// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::path::PathBuf;

use clap::Parser;
use jobgate::Dispatcher;
use jobgate_examples::cli::{init_logging, DispatchArgs};
use jobgate_examples::csv_job::CsvFileJob;
use log::info;

#[derive(Debug, Parser)]
#[command(author, version, about = "Prints CSV files, at most --max-jobs at a time")]
struct Args {
    /// CSV files to process, one job per file
    #[arg(default_values = ["test1.csv", "test2.csv"])]
    files: Vec<PathBuf>,

    #[command(flatten)]
    dispatch: DispatchArgs,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let dispatcher = Dispatcher::new(args.dispatch.to_config()?);
    for file in &args.files {
        let id = dispatcher.submit(CsvFileJob::new(file));
        info!("Queued {} as job {id}", file.display());
    }

    dispatcher.wait_all();
    args.dispatch.report(&dispatcher.stats())?;
    dispatcher.shutdown();
    Ok(())
}
