//! Coverage reducer invoked by `coverage.sh`.
//!
//! Reads `samtools mpileup` records from stdin, separates the positions the
//! client asked for explicitly and reduces the remaining depth track to at most
//! `max_points` windows. Output is two tab-separated sections:
//!
//! ```text
//! #specific_points
//! 130045	40
//! #reduced_points
//! 130000	33
//! ```

mod args;
mod pileup;
mod reduce;

use std::io::{self, BufRead, Write};

pub use args::{Cli, ParseArgError, Region};
pub use pileup::{DepthPoint, parse_line, read_points};
pub use reduce::{reduce_points, split_points};

/// Errors produced while reading pileup input or writing the report.
#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Runs the reducer over `input`, writing the report to `output`.
///
/// # Errors
///
/// Returns an error if a pileup line is malformed or if reading or writing fails.
pub fn run<R: BufRead, W: Write>(cli: &Cli, input: R, mut output: W) -> Result<(), CoverageError> {
    let points = read_points(input)?;
    let (reserved, remaining) = split_points(points, &cli.positions());

    let reduced = match cli.region {
        Some(ref region) => reduce_points(region.start, region.end, remaining, cli.max_points),
        None => remaining,
    };

    write_section(&mut output, "#specific_points", &reserved)?;
    write_section(&mut output, "#reduced_points", &reduced)?;
    output.flush()?;
    Ok(())
}

fn write_section<W: Write>(output: &mut W, header: &str, points: &[DepthPoint]) -> io::Result<()> {
    writeln!(output, "{header}")?;
    for point in points {
        writeln!(output, "{}\t{}", point.position, point.depth)?;
    }
    Ok(())
}
