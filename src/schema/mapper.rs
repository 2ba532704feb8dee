//! Column mapping to target schema and projection

use crate::config::ColumnMapping;
use crate::schema::types::{ColumnProjection, Projection, TargetColumn, TargetSchema};
use std::collections::HashSet;

/// Build the target schema and projection from ordered column mappings
///
/// Output order follows mapping order. Duplicate target names are kept
/// as-is; the engine decides what happens to them downstream.
pub fn map_columns(mappings: &[ColumnMapping]) -> (TargetSchema, Projection) {
    let mut seen = HashSet::new();
    for mapping in mappings {
        if !seen.insert(mapping.target_column.as_str()) {
            tracing::warn!(
                target_column = %mapping.target_column,
                "Duplicate target column in mapping, passing through"
            );
        }
    }

    let schema = TargetSchema::new(
        mappings
            .iter()
            .map(|m| TargetColumn {
                name: m.target_column.clone(),
                ty: m.target_type,
            })
            .collect(),
    );

    let projection = Projection::new(
        mappings
            .iter()
            .map(|m| ColumnProjection {
                source: m.src_column.clone(),
                target: m.target_column.clone(),
                ty: m.target_type,
            })
            .collect(),
    );

    (schema, projection)
}
