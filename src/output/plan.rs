//! Write plan: format, file layout and COPY options

use crate::database::quote_literal;
use crate::error::{Error, Result};
use crate::schema::quote_ident;
use std::str::FromStr;

/// Name of the single file written by unpartitioned jobs (plus extension)
pub const DATA_FILE_STEM: &str = "data";

/// Serialization format of the output files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Parquet,
    Csv,
    Json,
}

impl OutputFormat {
    /// File extension
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// COPY options selecting this format
    fn copy_options(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Parquet => &["FORMAT PARQUET", "COMPRESSION 'SNAPPY'"],
            OutputFormat::Csv => &["FORMAT CSV", "HEADER true"],
            OutputFormat::Json => &["FORMAT JSON"],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            "json" | "ndjson" => Ok(OutputFormat::Json),
            _ => Err(Error::write(format!(
                "Unsupported output format '{s}' (supported: parquet, csv, json)"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How the projected rows are written
///
/// Always overwrites: the caller clears the destination first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    root: String,
    format: OutputFormat,
    partition_by: Option<String>,
}

impl WritePlan {
    pub fn new(root: impl Into<String>, format: OutputFormat, partition_by: Option<String>) -> Self {
        Self {
            root: root.into().trim_end_matches('/').to_string(),
            format,
            partition_by,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn partition_by(&self) -> Option<&str> {
        self.partition_by.as_deref()
    }

    /// COPY target: the root directory when partitioned, else `root/data.<ext>`
    pub fn target(&self) -> String {
        if self.partition_by.is_some() {
            self.root.clone()
        } else {
            format!("{}/{DATA_FILE_STEM}.{}", self.root, self.format.extension())
        }
    }

    /// Physical partitioning directive, if any
    pub fn partition_directive(&self) -> Option<String> {
        self.partition_by
            .as_ref()
            .map(|column| format!("PARTITION_BY ({})", quote_ident(column)))
    }

    /// All COPY options in order
    pub fn copy_options(&self) -> Vec<String> {
        let mut options: Vec<String> = self
            .format
            .copy_options()
            .iter()
            .map(|o| (*o).to_string())
            .collect();

        if let Some(directive) = self.partition_directive() {
            options.push(directive);
            // The directory was cleared beforehand; this only lets DuckDB write into it
            options.push("OVERWRITE_OR_IGNORE true".to_string());
        }

        options
    }

    /// Full COPY statement reading from `relation`
    pub fn copy_sql(&self, relation: &str) -> String {
        format!(
            "COPY (SELECT * FROM {relation}) TO {} ({})",
            quote_literal(&self.target()),
            self.copy_options().join(", ")
        )
    }
}
