//! Sand Rocket CLI
//!
//! The binary in `main.rs` is a thin shell over these modules so the
//! command handlers can be driven from tests.

mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Commands};

/// Success
pub const EXIT_SUCCESS: i32 = 0;
/// The operation failed
pub const EXIT_ERROR: i32 = 1;
/// The input could not be understood (bad JSON, unknown operation, missing field)
pub const EXIT_USAGE: i32 = 2;
