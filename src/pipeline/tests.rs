//! Tests for the job runner

use super::*;
use crate::config::{load_job_config_from_str, JobConfig};
use crate::database::Session;
use crate::error::Phase;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn seeded_source(dir: &Path) -> PathBuf {
    let path = dir.join("events.duckdb");
    let conn = duckdb::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE EVENTS (ID BIGINT, NAME VARCHAR, TS VARCHAR, REGION VARCHAR);
         INSERT INTO EVENTS
           SELECT i, 'event-' || i, '2024-03-01 10:00:00', CASE WHEN i % 2 = 0 THEN 'eu' ELSE 'us' END
           FROM range(0, 12) t(i);",
    )
    .unwrap();
    drop(conn);
    path
}

fn job(source: &Path, output: &Path, overrides: Value) -> Value {
    let mut value = json!({
        "oracle": {
            "url": source.to_str().unwrap(),
            "user": "etl",
            "password": "secret",
            "table": "EVENTS"
        },
        "output": {
            "path": output.to_str().unwrap()
        },
        "schema": {
            "columns": [
                {"src_column": "ID", "target_column": "id", "target_type": "integer"},
                {"src_column": "NAME", "target_column": "name", "target_type": "string"},
                {"src_column": "TS", "target_column": "event_time", "target_type": "timestamp"}
            ]
        }
    });

    if let Value::Object(sections) = overrides {
        for (section, fields) in sections {
            let target = value[section.as_str()].as_object_mut().unwrap();
            target.extend(fields.as_object().unwrap().clone());
        }
    }
    value
}

fn load(value: &Value) -> JobConfig {
    load_job_config_from_str(&value.to_string()).unwrap()
}

fn parquet_count(path: &str) -> i64 {
    let conn = duckdb::Connection::open_in_memory().unwrap();
    conn.query_row(
        &format!("SELECT COUNT(*) FROM read_parquet('{path}')"),
        [],
        |row| row.get(0),
    )
    .unwrap()
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_job_writes_projected_parquet() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    let config = load(&job(&source, &output, json!({})));

    let report = run_job(&config).await.unwrap();

    assert_eq!(report.table, "EVENTS");
    assert_eq!(report.rows_written, 12);
    assert_eq!(report.format, "parquet");
    assert_eq!(report.columns, vec!["id", "name", "event_time"]);
    assert!(output.join("data.parquet").is_file());
}

#[tokio::test]
async fn test_job_overwrites_previous_output() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("stale.parquet"), b"left over").unwrap();

    let config = load(&job(
        &source,
        &output,
        json!({"oracle": {"where_clause": "ID < 5"}}),
    ));
    run_job(&config).await.unwrap();

    assert!(!output.join("stale.parquet").exists());
    let data = output.join("data.parquet");
    assert_eq!(parquet_count(data.to_str().unwrap()), 5);

    // A second run replaces the first, it does not append
    run_job(&config).await.unwrap();
    assert_eq!(parquet_count(data.to_str().unwrap()), 5);
}

#[tokio::test]
async fn test_job_partitioned_output() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let mut value = job(
        &source,
        &output,
        json!({"output": {"partition_column": "region"}}),
    );
    value["schema"]["columns"]
        .as_array_mut()
        .unwrap()
        .push(json!({"src_column": "REGION", "target_column": "region", "target_type": "string"}));
    let config = load(&value);

    let report = run_job(&config).await.unwrap();

    assert_eq!(report.rows_written, 12);
    assert_eq!(report.partition_column.as_deref(), Some("region"));
    assert!(output.join("region=eu").is_dir());
    assert!(output.join("region=us").is_dir());

    let glob = format!("{}/*/*.parquet", output.display());
    assert_eq!(parquet_count(&glob), 12);
}

#[tokio::test]
async fn test_job_partitioned_read() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let config = load(&job(
        &source,
        &output,
        json!({"oracle": {
            "src_partition_column": "ID",
            "partition_upper_bound": 8,
            "num_partitions": 4
        }}),
    ));

    let report = run_job(&config).await.unwrap();
    assert_eq!(report.rows_written, 12);
}

#[tokio::test]
async fn test_job_csv_output() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let config = load(&job(&source, &output, json!({"output": {"format": "csv"}})));
    let report = run_job(&config).await.unwrap();

    assert_eq!(report.format, "csv");
    let content = std::fs::read_to_string(output.join("data.csv")).unwrap();
    assert!(content.starts_with("id,name,event_time"));
    assert_eq!(content.lines().count(), 13);
}

#[tokio::test]
async fn test_runner_reaches_written() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    let config = load(&job(&source, &output, json!({})));

    let session = Session::open().unwrap();
    let mut runner = JobRunner::new(&session, &config);
    assert_eq!(runner.state(), JobState::Loaded);
    assert_eq!(runner.schema().len(), 3);

    runner.run().await.unwrap();
    assert_eq!(runner.state(), JobState::Written);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_missing_table_fails_in_read() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    let config = load(&job(
        &source,
        &output,
        json!({"oracle": {"table": "NO_SUCH_TABLE"}}),
    ));

    let session = Session::open().unwrap();
    let mut runner = JobRunner::new(&session, &config);
    let err = runner.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Read);
    assert_eq!(runner.state(), JobState::Loaded);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_source_column_fails_in_transform() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let mut value = job(&source, &output, json!({}));
    value["schema"]["columns"][0]["src_column"] = json!("NOPE");
    let config = load(&value);

    let session = Session::open().unwrap();
    let mut runner = JobRunner::new(&session, &config);
    let err = runner.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Transform);
    assert_eq!(runner.state(), JobState::Read);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_uncastable_value_fails_in_transform() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let mut value = job(&source, &output, json!({"output": {"format": "csv"}}));
    value["schema"]["columns"][1]["target_type"] = json!("integer");
    let config = load(&value);

    let session = Session::open().unwrap();
    let mut runner = JobRunner::new(&session, &config);
    let err = runner.run().await.unwrap_err();

    assert_eq!(err.phase(), Phase::Transform);
    assert_eq!(runner.state(), JobState::Read);
    assert!(err.to_string().contains("event-"));
}

#[tokio::test]
async fn test_failed_projection_keeps_previous_output() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");

    let good = job(&source, &output, json!({"output": {"format": "csv"}}));
    run_job(&load(&good)).await.unwrap();
    let before = std::fs::read_to_string(output.join("data.csv")).unwrap();
    assert_eq!(before.lines().count(), 13);

    let mut bad = good.clone();
    bad["schema"]["columns"][1]["target_type"] = json!("integer");
    let err = run_job(&load(&bad)).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Transform);

    let after = std::fs::read_to_string(output.join("data.csv")).unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_unsupported_format_fails_in_write() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    let config = load(&job(&source, &output, json!({"output": {"format": "orc"}})));

    let err = run_job(&config).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Write);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_unknown_partition_column_fails_in_write() {
    let temp = tempdir().unwrap();
    let source = seeded_source(temp.path());
    let output = temp.path().join("out");
    let config = load(&job(
        &source,
        &output,
        json!({"output": {"partition_column": "region"}}),
    ));

    let err = run_job(&config).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Write);
    assert!(err.to_string().contains("'region'"));
}

#[tokio::test]
async fn test_unsupported_source_scheme_fails_in_read() {
    let temp = tempdir().unwrap();
    let output = temp.path().join("out");

    let mut value = job(temp.path(), &output, json!({}));
    value["oracle"]["url"] = json!("jdbc:oracle:thin:@db.internal:1521/ORCL");
    let config = load(&value);

    let err = run_job(&config).await.unwrap_err();
    assert_eq!(err.phase(), Phase::Read);
}

// ============================================================================
// State Tests
// ============================================================================

#[test]
fn test_state_order() {
    assert_eq!(JobState::Loaded.next(), Some(JobState::Read));
    assert_eq!(JobState::Read.next(), Some(JobState::Projected));
    assert_eq!(JobState::Projected.next(), Some(JobState::Written));
    assert_eq!(JobState::Written.next(), None);
}
