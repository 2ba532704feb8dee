//! Pipeline types
//!
//! Job states and the completion report.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Position of a job in its linear state machine
///
/// `Loaded -> Read -> Projected -> Written`, no back-edges. A failing job
/// stops in the last state it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    /// Config parsed, schema mapped
    Loaded,
    /// Source attached and read bound
    Read,
    /// Projection bound and checked
    Projected,
    /// Output written
    Written,
}

impl JobState {
    /// The state that follows this one, if any
    pub fn next(self) -> Option<JobState> {
        match self {
            JobState::Loaded => Some(JobState::Read),
            JobState::Read => Some(JobState::Projected),
            JobState::Projected => Some(JobState::Written),
            JobState::Written => None,
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Loaded => write!(f, "loaded"),
            JobState::Read => write!(f, "read"),
            JobState::Projected => write!(f, "projected"),
            JobState::Written => write!(f, "written"),
        }
    }
}

/// Summary of a completed job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Source table as configured
    pub table: String,
    /// Destination root
    pub destination: String,
    /// Output format
    pub format: String,
    /// Output partition column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_column: Option<String>,
    /// Output column names in order
    pub columns: Vec<String>,
    /// Rows written
    pub rows_written: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobReport {
    /// Wall-clock duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
