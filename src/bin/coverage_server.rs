//! Shim binary that calls into the `coverage_server` library's `inner_main`.
use clap::Parser as _;
use coverage_server::cli::Cli;
use eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    coverage_server::inner_main(Cli::parse()).await
}
