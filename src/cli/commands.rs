//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Copy a database table to columnar files
#[derive(Parser, Debug)]
#[command(name = "tablecast")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// Job configuration file (JSON)
    #[arg(required = true)]
    pub config: Option<PathBuf>,

    /// How the completion report is printed
    #[arg(short, long, global = true, default_value = "json")]
    pub format: ReportFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file with an SFTP client
    Transfer {
        /// Remote user
        #[arg(short, long)]
        user: String,

        /// Remote host
        #[arg(long)]
        host: String,

        /// Remote directory to put the file in
        #[arg(short, long)]
        remote_dir: String,

        /// Local file to upload
        file: PathBuf,

        /// Client executable
        #[arg(long, default_value = crate::transfer::DEFAULT_PROGRAM)]
        program: String,
    },
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// One JSON message per line
    Json,
    /// Indented JSON
    Pretty,
}
