// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use jobgate::Job;
use log::{debug, error};

/// Prints every record of one CSV file.
#[derive(Debug, Clone)]
pub struct CsvFileJob {
    path: PathBuf,
    desc: String,
}

impl CsvFileJob {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let desc = format!("process {}", path.display());
        Self { path, desc }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Job for CsvFileJob {
    fn run(&mut self) {
        let records = match read_records(&self.path) {
            Ok(records) => records,
            Err(e) => {
                // the job owns its failures, the dispatcher just moves on
                error!("Could not read {}: {e}", self.path.display());
                return;
            }
        };
        for record in &records {
            println!("Record: {:?}", record);
        }
        debug!("{} records in {}", records.len(), self.path.display());
        println!("Finished processing file: {}", self.path.display());
        println!();
    }

    fn desc(&self) -> &str {
        &self.desc
    }
}

/// Reads all records of a CSV file. Empty lines are skipped.
pub fn read_records(path: &Path) -> io::Result<Vec<Vec<String>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        records.push(split_record(line));
    }
    Ok(records)
}

/// Splits one line at commas. Fields may be double-quoted; `""` inside quotes
/// is a literal quote.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    fields.push(field);
    fields
}
