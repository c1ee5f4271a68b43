//! Parsing of `samtools mpileup` records.

use std::io::BufRead;

use crate::CoverageError;

/// Read depth at one reference position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthPoint {
    pub position: u32,
    pub depth: u32,
}

impl DepthPoint {
    #[must_use]
    pub const fn new(position: u32, depth: u32) -> Self {
        Self { position, depth }
    }
}

/// Parses one pileup line. Returns `Ok(None)` for samtools diagnostic lines and blank lines.
///
/// # Errors
///
/// Returns a reason string if the position (column 2) or depth (column 4) is missing or not numeric.
pub fn parse_line(line: &str) -> Result<Option<DepthPoint>, String> {
    if line.starts_with("[mpileup]") || line.starts_with("<mpileup>") || line.trim().is_empty() {
        return Ok(None);
    }
    let mut columns = line.split('\t');
    let position = columns.nth(1).ok_or("missing position column")?;
    let depth = columns.nth(1).ok_or("missing depth column")?;
    Ok(Some(DepthPoint {
        position: position
            .parse()
            .map_err(|e| format!("invalid position '{position}': {e}"))?,
        depth: depth
            .parse()
            .map_err(|e| format!("invalid depth '{depth}': {e}"))?,
    }))
}

/// Reads all depth points from pileup input, in input order.
///
/// # Errors
///
/// Returns an error on the first malformed line or if reading fails.
pub fn read_points<R: BufRead>(input: R) -> Result<Vec<DepthPoint>, CoverageError> {
    let mut points = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(point)) => points.push(point),
            Ok(None) => {}
            Err(reason) => {
                return Err(CoverageError::Malformed {
                    line: idx + 1,
                    reason,
                });
            }
        }
    }
    Ok(points)
}
