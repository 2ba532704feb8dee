//! Schema mapping module
//!
//! Turns the configured column mappings into the target schema and the
//! rename/cast projection applied to the source rows.
//!
//! # Types
//!
//! | Config name | Engine type | Arrow type |
//! |-------------|-------------|------------|
//! | `string`    | `VARCHAR`   | `Utf8` |
//! | `integer`   | `INTEGER`   | `Int32` |
//! | `timestamp` | `TIMESTAMP` | `Timestamp(Microsecond, None)` |

mod mapper;
mod types;

pub use mapper::map_columns;
pub use types::{
    quote_ident, ColumnProjection, Projection, SemanticType, TargetColumn, TargetSchema,
};
