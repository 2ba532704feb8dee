//! End-to-end job tests
//!
//! Jobs read from a DuckDB file created per test. The PostgreSQL test
//! needs a live database; set POSTGRES_TEST_URL to run it.

use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use tablecast::{load_job_config, load_job_config_from_str, run_job, Phase};

fn seed_events(dir: &Path) -> PathBuf {
    let path = dir.join("warehouse.duckdb");
    let conn = duckdb::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE EVENTS (ID BIGINT, NAME VARCHAR, TS TIMESTAMP, EXTRA VARCHAR);
         INSERT INTO EVENTS VALUES
           (1, 'alpha', TIMESTAMP '2024-01-01 08:00:00', 'x'),
           (2, 'beta',  TIMESTAMP '2024-01-02 09:30:00', 'y'),
           (3, 'gamma', TIMESTAMP '2024-01-03 17:45:00', 'z');",
    )
    .unwrap();
    drop(conn);
    path
}

fn write_job(dir: &Path, source: &Path, output: &Path) -> PathBuf {
    let job = json!({
        "oracle": {
            "url": format!("jdbc:duckdb:{}", source.display()),
            "user": "reporting",
            "password": "hunter2",
            "table": "EVENTS"
        },
        "output": {"path": output.to_str().unwrap(), "format": "parquet"},
        "schema": {
            "columns": [
                {"src_column": "ID", "target_column": "id", "target_type": "integer"},
                {"src_column": "NAME", "target_column": "name", "target_type": "string"},
                {"src_column": "TS", "target_column": "event_time", "target_type": "timestamp"}
            ]
        }
    });
    let path = dir.join("job.json");
    std::fs::write(&path, job.to_string()).unwrap();
    path
}

fn read_back(path: &Path) -> (Vec<(String, DataType)>, usize) {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let fields = builder
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().clone(), f.data_type().clone()))
        .collect();
    let rows = builder
        .build()
        .unwrap()
        .map(|batch| batch.unwrap().num_rows())
        .sum();
    (fields, rows)
}

#[tokio::test]
async fn test_job_renames_and_casts_columns() {
    let temp = tempfile::tempdir().unwrap();
    let source = seed_events(temp.path());
    let output = temp.path().join("events");

    // Stale output must not survive the run
    std::fs::create_dir_all(output.join("old")).unwrap();
    std::fs::write(output.join("old/part-0.parquet"), b"stale").unwrap();

    let config = load_job_config(write_job(temp.path(), &source, &output)).unwrap();
    let report = run_job(&config).await.unwrap();
    assert_eq!(report.rows_written, 3);

    assert!(!output.join("old").exists());

    let (fields, rows) = read_back(&output.join("data.parquet"));
    assert_eq!(rows, 3);

    let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "event_time"]);
    assert_eq!(fields[0].1, DataType::Int32);
    assert_eq!(fields[1].1, DataType::Utf8);
    assert!(matches!(fields[2].1, DataType::Timestamp(_, _)));
}

#[tokio::test]
async fn test_config_errors_precede_io() {
    let temp = tempfile::tempdir().unwrap();
    let output = temp.path().join("never");

    let json = json!({
        "oracle": {"url": "postgresql://nowhere.invalid/db", "user": "u", "password": "p", "table": "T"},
        "output": {"path": output.to_str().unwrap()}
    });
    let err = load_job_config_from_str(&json.to_string()).unwrap_err();

    assert_eq!(err.phase(), Phase::Config);
    assert!(!output.exists());
}

#[test]
fn test_binary_without_arguments_exits_one() {
    let status = Command::new(env!("CARGO_BIN_EXE_tablecast"))
        .output()
        .unwrap()
        .status;
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_binary_runs_job() {
    let temp = tempfile::tempdir().unwrap();
    let source = seed_events(temp.path());
    let output = temp.path().join("events");
    let job = write_job(temp.path(), &source, &output);

    let result = Command::new(env!("CARGO_BIN_EXE_tablecast"))
        .arg(&job)
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(0));

    let stdout = String::from_utf8(result.stdout).unwrap();
    let message: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(message["type"], "JOB_COMPLETE");
    assert_eq!(message["report"]["rows_written"], 3);

    // Credentials never reach the logs
    let stderr = String::from_utf8(result.stderr).unwrap();
    assert!(!stderr.contains("hunter2"));
}

#[test]
fn test_binary_reports_failure() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("missing.json");

    let result = Command::new(env!("CARGO_BIN_EXE_tablecast"))
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8(result.stderr).unwrap().contains("Error:"));
}

#[tokio::test]
async fn test_postgres_source() {
    let Ok(url) = std::env::var("POSTGRES_TEST_URL") else {
        println!("Skipping: POSTGRES_TEST_URL not set");
        return;
    };
    let table = std::env::var("POSTGRES_TEST_TABLE").unwrap_or_else(|_| "public.events".to_string());

    let temp = tempfile::tempdir().unwrap();
    let output = temp.path().join("pg");
    let json = json!({
        "oracle": {"url": url, "user": "postgres", "password": "postgres", "table": table},
        "output": {"path": output.to_str().unwrap()},
        "schema": {"columns": [{"src_column": "id", "target_column": "id", "target_type": "integer"}]}
    });

    let config = load_job_config_from_str(&json.to_string()).unwrap();
    let report = run_job(&config).await.unwrap();
    assert!(output.join("data.parquet").is_file());
    println!("Copied {} rows from {}", report.rows_written, report.table);
}
