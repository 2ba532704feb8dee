// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tablecast
//!
//! Copies one relational table into columnar files, renaming and casting
//! columns on the way, as described by a JSON job file.
//!
//! ## Features
//!
//! - **Sources**: PostgreSQL, MySQL/MariaDB, SQLite and DuckDB through DuckDB's scanners
//! - **Partitioned Reads**: Range-split reads over a numeric column
//! - **Typed Projection**: `string`, `integer` and `timestamp` target columns
//! - **Output**: Parquet, CSV or JSON, optionally Hive-partitioned, always overwritten
//! - **Cloud Destinations**: S3, R2, GCS and Azure Blob
//! - **Transfer**: Upload a file with an SFTP client in batch mode
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tablecast::{load_job_config, run_job, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = load_job_config("jobs/orders.json")?;
//!     let report = run_job(&config).await?;
//!     println!("{} rows written to {}", report.rows_written, report.destination);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Job config                           │
//! │        source (oracle)  ·  output  ·  schema.columns         │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴──────────────┬─────────────────┐
//! │     Read     │          Project            │      Write      │
//! ├──────────────┼─────────────────────────────┼─────────────────┤
//! │ ATTACH       │ CAST ... AS ... per column  │ clear + COPY    │
//! │ WHERE filter │ target order                │ PARTITION_BY    │
//! │ range splits │ type check                  │ Parquet check   │
//! └──────────────┴─────────────────────────────┴─────────────────┘
//!                     one DuckDB session per job
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and phases
pub mod error;

/// Job configuration loading
pub mod config;

/// Semantic types and column projection
pub mod schema;

/// Source resolution and the DuckDB session
pub mod database;

/// Destinations, write plans and output checks
pub mod output;

/// Read, project and write a job
pub mod pipeline;

/// SFTP upload
pub mod transfer;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Phase, Result};

pub use config::{load_job_config, load_job_config_from_str, JobConfig};
pub use pipeline::{run_job, JobReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
