//! Pipeline module
//!
//! Runs a job end to end.
//!
//! # Overview
//!
//! - `run_job` - Opens a session, runs the job, releases the session
//! - `JobRunner` - Walks `Loaded → Read → Projected → Written`
//! - `JobReport` - What was written where

mod runner;
mod types;

pub use runner::{run_job, run_with_session, JobRunner, PROJECTED_TABLE, SOURCE_VIEW};
pub use types::{JobReport, JobState};

#[cfg(test)]
mod tests;
