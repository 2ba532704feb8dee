//! Source database access via DuckDB
//!
//! This module attaches the relational source to an embedded DuckDB
//! session and builds the read. DuckDB reaches PostgreSQL, MySQL and
//! SQLite through its extensions and reads DuckDB files natively.

mod read;
mod session;
mod source;

pub use read::{
    ReadPartitioning, ReadPlan, ReadTarget, OPT_DBTABLE, OPT_LOWER_BOUND, OPT_NUM_PARTITIONS,
    OPT_PARTITION_COLUMN, OPT_UPPER_BOUND,
};
pub use session::{Session, SOURCE_CATALOG};
pub use source::{SourceKind, SourceLocator};

pub(crate) use source::quote_literal;
