//! JSON loader for job configs
//!
//! All validation happens here, before any connection or storage call.

use crate::config::types::{ColumnMapping, JobConfig, OutputConfig, SourceConfig};
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Accepted names for the source section, first one is canonical
const SOURCE_SECTIONS: [&str; 2] = ["oracle", "source"];

const SOURCE_REQUIRED: [&str; 4] = ["url", "user", "password", "table"];

const OUTPUT_REQUIRED: [&str; 1] = ["path"];

/// Load a job config from a JSON file
pub fn load_job_config(path: impl AsRef<Path>) -> Result<JobConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read job config '{}': {e}",
            path.display()
        ))
    })?;
    load_job_config_from_str(&content)
}

/// Load a job config from a JSON string
pub fn load_job_config_from_str(json: &str) -> Result<JobConfig> {
    let root: Value = serde_json::from_str(json)?;
    let root = root
        .as_object()
        .ok_or_else(|| Error::config("Job config must be a JSON object"))?;

    // Sections first, then their parameters, then types
    let (source_name, source) = source_section(root)?;
    let output = section(root, "output")?;
    let columns = columns_section(root)?;

    require(source, source_name, &SOURCE_REQUIRED)?;
    require(output, "output", &OUTPUT_REQUIRED)?;

    let mut source: SourceConfig = serde_json::from_value(Value::Object(source.clone()))?;
    let mut output: OutputConfig = serde_json::from_value(Value::Object(output.clone()))?;
    let columns = parse_columns(columns)?;

    source.where_clause = non_blank(source.where_clause);
    source.src_partition_column = non_blank(source.src_partition_column);
    output.partition_column = non_blank(output.partition_column);

    validate_partitioning(&source)?;

    Ok(JobConfig {
        source,
        output,
        columns,
    })
}

fn source_section(root: &Map<String, Value>) -> Result<(&'static str, &Map<String, Value>)> {
    SOURCE_SECTIONS
        .iter()
        .find_map(|name| non_empty_object(root.get(*name)).map(|obj| (*name, obj)))
        .ok_or_else(|| Error::missing_section(SOURCE_SECTIONS[0]))
}

fn section<'a>(root: &'a Map<String, Value>, name: &str) -> Result<&'a Map<String, Value>> {
    non_empty_object(root.get(name)).ok_or_else(|| Error::missing_section(name))
}

fn columns_section(root: &Map<String, Value>) -> Result<&Vec<Value>> {
    root.get("schema")
        .and_then(|s| s.get("columns"))
        .and_then(Value::as_array)
        .filter(|columns| !columns.is_empty())
        .ok_or_else(|| Error::missing_section("schema.columns"))
}

fn non_empty_object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value
        .and_then(Value::as_object)
        .filter(|obj| !obj.is_empty())
}

/// Every key must be present as a non-empty string
fn require(obj: &Map<String, Value>, section: &str, keys: &[&str]) -> Result<()> {
    for key in keys {
        required_str(obj, key).ok_or_else(|| Error::missing_parameter(format!("{section}.{key}")))?;
    }
    Ok(())
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_columns(entries: &[Value]) -> Result<Vec<ColumnMapping>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<ColumnMapping> {
            let prefix = format!("schema.columns[{i}]");
            let obj = entry
                .as_object()
                .ok_or_else(|| Error::config(format!("{prefix} must be an object")))?;

            let field = |key: &str| {
                required_str(obj, key)
                    .map(String::from)
                    .ok_or_else(|| Error::missing_parameter(format!("{prefix}.{key}")))
            };

            let src_column = field("src_column")?;
            let target_column = field("target_column")?;
            let target_type = match obj.get("target_type") {
                Some(Value::String(name)) => name.parse()?,
                Some(other) => return Err(Error::unsupported_type(other.to_string())),
                None => return Err(Error::missing_parameter(format!("{prefix}.target_type"))),
            };

            Ok(ColumnMapping {
                src_column,
                target_column,
                target_type,
            })
        })
        .collect()
}

fn validate_partitioning(source: &SourceConfig) -> Result<()> {
    if source.src_partition_column.is_none() {
        return Ok(());
    }

    if source.partition_lower_bound > source.partition_upper_bound {
        return Err(Error::config(format!(
            "partition_lower_bound ({}) must not exceed partition_upper_bound ({})",
            source.partition_lower_bound, source.partition_upper_bound
        )));
    }

    if source.num_partitions == 0 {
        return Err(Error::config("num_partitions must be at least 1"));
    }

    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
