//! Schema types

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// Semantic column type a mapping can cast to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    String,
    Integer,
    Timestamp,
}

impl SemanticType {
    /// All supported types, in declaration order
    pub const ALL: [SemanticType; 3] = [
        SemanticType::String,
        SemanticType::Integer,
        SemanticType::Timestamp,
    ];

    /// Name used in job configs
    pub fn name(self) -> &'static str {
        match self {
            SemanticType::String => "string",
            SemanticType::Integer => "integer",
            SemanticType::Timestamp => "timestamp",
        }
    }

    /// SQL type the query engine casts to
    pub fn engine_type(self) -> &'static str {
        match self {
            SemanticType::String => "VARCHAR",
            SemanticType::Integer => "INTEGER",
            SemanticType::Timestamp => "TIMESTAMP",
        }
    }

    /// Arrow type of the column once written
    pub fn arrow_type(self) -> DataType {
        match self {
            SemanticType::String => DataType::Utf8,
            SemanticType::Integer => DataType::Int32,
            SemanticType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }
}

impl FromStr for SemanticType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SemanticType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| Error::unsupported_type(s))
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One column of the target schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemanticType,
}

/// Ordered output schema derived from the column mappings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSchema {
    columns: Vec<TargetColumn>,
}

impl TargetSchema {
    /// Create a schema from ordered columns
    pub fn new(columns: Vec<TargetColumn>) -> Self {
        Self { columns }
    }

    /// Columns in output order
    pub fn columns(&self) -> &[TargetColumn] {
        &self.columns
    }

    /// Column names in output order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name (first match)
    pub fn column(&self, name: &str) -> Option<&TargetColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Convert to an Arrow schema (all fields nullable)
    pub fn to_arrow(&self) -> Schema {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(&c.name, c.ty.arrow_type(), true))
            .collect();
        Schema::new(fields)
    }
}

/// A single rename + cast from a source column to a target column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjection {
    pub source: String,
    pub target: String,
    pub ty: SemanticType,
}

impl ColumnProjection {
    /// Render as a SQL select expression
    ///
    /// `CAST("ID" AS INTEGER) AS "id"`
    pub fn to_sql(&self) -> String {
        format!(
            "CAST({} AS {}) AS {}",
            quote_ident(&self.source),
            self.ty.engine_type(),
            quote_ident(&self.target)
        )
    }
}

/// Ordered list of projection expressions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    columns: Vec<ColumnProjection>,
}

impl Projection {
    pub fn new(columns: Vec<ColumnProjection>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnProjection] {
        &self.columns
    }

    /// Render the comma-separated select list
    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(ColumnProjection::to_sql)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Wrap `relation` in a projecting SELECT
    pub fn apply_to(&self, relation: &str) -> String {
        format!("SELECT {} FROM {relation}", self.select_list())
    }
}

/// Quote a SQL identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
