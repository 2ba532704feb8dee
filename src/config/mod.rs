//! Job configuration
//!
//! Loads and validates the JSON job file. Missing sections, missing
//! required parameters and unsupported column types are all rejected
//! here, before the pipeline opens any connection.

mod loader;
mod types;

pub use loader::{load_job_config, load_job_config_from_str};
pub use types::{
    ColumnMapping, JobConfig, OutputConfig, SourceConfig, DEFAULT_FORMAT, DEFAULT_LOWER_BOUND,
    DEFAULT_NUM_PARTITIONS, DEFAULT_UPPER_BOUND,
};
