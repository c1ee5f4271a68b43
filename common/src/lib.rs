//! Types shared between the coverage server, its socket clients and the integration tests.
//!
//! This crate provides:
//! - The tool descriptor advertised to the dispatcher
//! - The message types spoken over the binary socket

mod descriptor;
mod protocol;

pub use descriptor::*;
pub use protocol::*;

/// Port the coverage server listens on when none is given.
pub const DEFAULT_PORT: u16 = 8047;
