//! Archi CLI: describe a directory, estimate the work, or build an architecture report.

use anyhow::Result;
use archi::engine::arg_parser::Cli;
use archi::engine::handle_run;
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
