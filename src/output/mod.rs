//! Output module
//!
//! Handles the write side of a job.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Resolving and clearing destinations (local, S3, R2, GCS, Azure)
//! - Building the COPY statement for the chosen format and partitioning
//! - Reading back written Parquet files to check their schema

mod destination;
mod plan;
mod verify;

pub use destination::Destination;
pub use plan::{OutputFormat, WritePlan, DATA_FILE_STEM};
pub use verify::{type_matches, verify_parquet_schema};
