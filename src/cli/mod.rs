//! CLI module
//!
//! - replay: run a recorded batch plan through the real
//!   builder → engine → reconciler path with simulated statements

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{replay, run, run_command, PlannedUnit, ReplayPlan, ReplayStatement};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
