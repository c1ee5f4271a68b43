//! Shim binary for the coverage reducer that `coverage.sh` pipes pileup output into.
use std::io;

use clap::Parser as _;
use coverage_tool::Cli;
use eyre::{Result, WrapErr as _};

fn main() -> Result<()> {
    let cli = Cli::parse();
    coverage_tool::run(&cli, io::stdin().lock(), io::stdout().lock())
        .wrap_err("Failed to reduce coverage")?;
    Ok(())
}
