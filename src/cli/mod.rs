//! CLI module
//!
//! Command-line interface for running jobs.
//!
//! # Commands
//!
//! - `tablecast <CONFIG>` - Run the job described by a JSON file
//! - `transfer` - Upload a file with an SFTP client

mod commands;
mod runner;

pub use commands::{Cli, Commands, ReportFormat};
pub use runner::Runner;
