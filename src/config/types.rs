//! Job configuration types
//!
//! Mirrors the JSON job file:
//!
//! ```json
//! {
//!   "oracle": { "url": "...", "user": "...", "password": "...", "table": "..." },
//!   "output": { "path": "...", "format": "parquet" },
//!   "schema": { "columns": [ { "src_column": "ID", "target_column": "id", "target_type": "integer" } ] }
//! }
//! ```

use crate::schema::SemanticType;
use serde::{Deserialize, Serialize};

/// Default lower bound for partitioned reads
pub const DEFAULT_LOWER_BOUND: i64 = 0;

/// Default upper bound for partitioned reads
pub const DEFAULT_UPPER_BOUND: i64 = 1000;

/// Default number of read partitions
pub const DEFAULT_NUM_PARTITIONS: u32 = 10;

/// Default output format
pub const DEFAULT_FORMAT: &str = "parquet";

// ============================================================================
// Top-Level Job Config
// ============================================================================

/// Parsed job configuration
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Source connection and read settings
    pub source: SourceConfig,
    /// Destination settings
    pub output: OutputConfig,
    /// Column mappings in output order
    pub columns: Vec<ColumnMapping>,
}

// ============================================================================
// Source
// ============================================================================

/// Source database settings (the `oracle` section)
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection URL, optionally `jdbc:`-prefixed
    pub url: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Table to read (`schema.table` supported)
    pub table: String,
    /// Optional filter predicate
    #[serde(default)]
    pub where_clause: Option<String>,
    /// Column to split the read on
    #[serde(default)]
    pub src_partition_column: Option<String>,
    #[serde(default = "default_lower_bound")]
    pub partition_lower_bound: i64,
    #[serde(default = "default_upper_bound")]
    pub partition_upper_bound: i64,
    #[serde(default = "default_num_partitions")]
    pub num_partitions: u32,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"****")
            .field("table", &self.table)
            .field("where_clause", &self.where_clause)
            .field("src_partition_column", &self.src_partition_column)
            .field("partition_lower_bound", &self.partition_lower_bound)
            .field("partition_upper_bound", &self.partition_upper_bound)
            .field("num_partitions", &self.num_partitions)
            .finish()
    }
}

fn default_lower_bound() -> i64 {
    DEFAULT_LOWER_BOUND
}

fn default_upper_bound() -> i64 {
    DEFAULT_UPPER_BOUND
}

fn default_num_partitions() -> u32 {
    DEFAULT_NUM_PARTITIONS
}

// ============================================================================
// Output
// ============================================================================

/// Destination settings (the `output` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination directory: local path or `s3://`, `r2://`, `gs://`, `az://` URL
    pub path: String,
    /// Serialization format name
    #[serde(default = "default_format")]
    pub format: String,
    /// Output column to partition files by
    #[serde(default)]
    pub partition_column: Option<String>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

// ============================================================================
// Column Mapping
// ============================================================================

/// One source column mapped to one typed target column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub src_column: String,
    pub target_column: String,
    pub target_type: SemanticType,
}
