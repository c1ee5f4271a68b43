//! Positional arguments of `get_coverage`.

use core::{num::ParseIntError, str::FromStr};

use clap::Parser;

/// Reduce `samtools mpileup` output to a bounded number of depth points.
#[derive(Debug, Parser)]
#[command(name = "get_coverage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Maximum number of points in the reduced section. Values of 0 or 1 disable reduction.
    #[arg(default_value_t = 0)]
    pub max_points: usize,

    /// Region the pileup covers, as `reference:start:end`.
    pub region: Option<Region>,

    /// Positions to report unreduced, as comma separated `reference:start:end` (zero-based start).
    #[arg(value_delimiter = ',')]
    pub specific: Vec<Region>,
}

impl Cli {
    /// One-based positions of the specific points, matching pileup coordinates.
    #[must_use]
    pub fn positions(&self) -> Vec<u32> {
        self.specific
            .iter()
            .map(|region| region.start.saturating_add(1))
            .collect()
    }
}

/// A `reference:start:end` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub reference: String,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseArgError {
    #[error("expected reference:start:end, got '{0}'")]
    Shape(String),
    #[error("invalid coordinate in '{input}': {source}")]
    Coordinate {
        input: String,
        #[source]
        source: ParseIntError,
    },
}

impl FromStr for Region {
    type Err = ParseArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split(':');
        let (Some(reference), Some(start), Some(end), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseArgError::Shape(s.to_string()));
        };
        let coordinate = |value: &str| {
            value.parse().map_err(|source| ParseArgError::Coordinate {
                input: s.to_string(),
                source,
            })
        };
        Ok(Self {
            reference: reference.to_string(),
            start: coordinate(start)?,
            end: coordinate(end)?,
        })
    }
}
