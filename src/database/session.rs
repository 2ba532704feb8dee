//! DuckDB engine session
//!
//! One in-memory DuckDB connection per job. The source database is
//! attached read-only under [`SOURCE_CATALOG`]; the read is a view on top
//! of it, the projection is materialized into a temporary table, and the
//! write is a `COPY` out of that table. DuckDB plans and parallelises all
//! of it.

use crate::database::source::{quote_literal, SourceLocator};
use crate::error::{Error, Phase, Result, ResultExt};
use duckdb::Connection;

/// Catalog name the source database is attached under
pub const SOURCE_CATALOG: &str = "source_db";

/// Handle on the query engine for the duration of one job
///
/// Dropping the session closes the connection and detaches the source,
/// on success and error paths alike.
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Open a fresh in-memory session
    pub fn open() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .phase_context(Phase::Read, "Failed to create DuckDB session")?;
        tracing::debug!("Engine session opened");
        Ok(Self { conn })
    }

    /// Underlying DuckDB connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Load the needed extension and attach the source read-only
    pub fn attach_source(&self, source: &SourceLocator) -> Result<()> {
        if let Some(ext) = source.kind().extension() {
            self.conn
                .execute_batch(&format!("INSTALL {ext}; LOAD {ext};"))
                .with_phase_context(Phase::Read, || {
                    format!("Failed to load {ext} extension")
                })?;
        }

        self.conn
            .execute_batch(&source.attach_sql(SOURCE_CATALOG))
            .with_phase_context(Phase::Read, || {
                format!("Failed to attach {} source {}", source.kind(), source.masked())
            })?;

        tracing::info!(kind = %source.kind(), source = %source.masked(), "Source attached");
        Ok(())
    }

    /// Configure cloud storage credentials (S3, R2, GCS, Azure) from environment
    pub fn configure_cloud_storage(&self) -> Result<()> {
        self.conn
            .execute_batch("INSTALL httpfs; LOAD httpfs;")
            .phase_context(Phase::Write, "Failed to load httpfs extension")?;

        for (store, sql) in cloud_settings(|key| std::env::var(key).ok()) {
            self.conn
                .execute_batch(&sql)
                .with_phase_context(Phase::Write, || format!("Failed to configure {store}"))?;
        }

        Ok(())
    }

    /// Create `name` as a temporary table holding the rows of `sql`
    ///
    /// Every row is computed here, so cast failures surface as `phase`
    /// instead of during a later write.
    pub fn create_table(&self, name: &str, sql: &str, phase: Phase) -> Result<()> {
        tracing::debug!(table = name, sql, "Materializing table");
        self.conn
            .execute_batch(&format!("CREATE OR REPLACE TEMP TABLE {name} AS {sql};"))
            .with_phase_context(phase, || format!("Failed to materialize {name}"))
    }

    /// Bind `sql` as a temporary view; binding errors are reported as `phase`
    pub fn create_view(&self, name: &str, sql: &str, phase: Phase) -> Result<()> {
        tracing::debug!(view = name, sql, "Creating view");
        self.conn
            .execute_batch(&format!("CREATE OR REPLACE TEMP VIEW {name} AS {sql};"))
            .with_phase_context(phase, || format!("Failed to bind view {name}"))
    }

    /// Column names and engine types of a relation, in order
    pub fn describe(&self, relation: &str, phase: Phase) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("DESCRIBE {relation}"))
            .with_phase_context(phase, || format!("Failed to describe {relation}"))?;

        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .with_phase_context(phase, || format!("Failed to describe {relation}"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_phase_context(phase, || format!("Failed to describe {relation}"))?;

        Ok(columns)
    }

    /// Run a `COPY ... TO` statement, returning the number of rows copied
    ///
    /// DuckDB reports the count as a one-row result; if it does not,
    /// `relation` is counted instead.
    pub fn copy_to(&self, sql: &str, relation: &str, phase: Phase) -> Result<usize> {
        tracing::debug!(sql, "Executing copy");
        let reported = {
            let mut stmt = self
                .conn
                .prepare(sql)
                .map_err(|e| Error::in_phase(phase, e.to_string()))?;
            let mut rows = stmt
                .query([])
                .map_err(|e| Error::in_phase(phase, e.to_string()))?;

            match rows.next() {
                Ok(Some(row)) => row.get::<_, i64>(0).ok(),
                Ok(None) => None,
                Err(e) => return Err(Error::in_phase(phase, e.to_string())),
            }
        };

        let count = match reported {
            Some(count) => count,
            None => self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {relation}"), [], |row| {
                    row.get(0)
                })
                .with_phase_context(phase, || format!("Failed to count rows of {relation}"))?,
        };
        Ok(count as usize)
    }
}

/// Engine settings for whichever cloud credentials `env` provides
///
/// Returns `(store, statements)` pairs; values are quoted as SQL literals.
pub(crate) fn cloud_settings(env: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, String)> {
    let mut settings = Vec::new();

    if let (Some(key_id), Some(secret)) = (env("AWS_ACCESS_KEY_ID"), env("AWS_SECRET_ACCESS_KEY")) {
        let region = env("AWS_DEFAULT_REGION").unwrap_or_else(|| "us-east-1".to_string());
        settings.push((
            "S3",
            format!(
                "SET s3_access_key_id = {}; SET s3_secret_access_key = {}; SET s3_region = {};",
                quote_literal(&key_id),
                quote_literal(&secret),
                quote_literal(&region)
            ),
        ));

        // R2 and MinIO are reached through the S3 endpoint setting
        if let Some(endpoint) = env("R2_ENDPOINT_URL").or_else(|| env("AWS_ENDPOINT")) {
            let host = endpoint
                .trim_start_matches("https://")
                .trim_start_matches("http://");
            settings.push((
                "S3 endpoint",
                format!(
                    "SET s3_endpoint = {}; SET s3_url_style = 'path';",
                    quote_literal(host)
                ),
            ));
        }
    }

    if let Some(service_account) = env("GOOGLE_SERVICE_ACCOUNT") {
        settings.push((
            "GCS",
            format!("SET gcs_credentials_file = {};", quote_literal(&service_account)),
        ));
    }

    if let Some(connection_string) = env("AZURE_STORAGE_CONNECTION_STRING") {
        settings.push((
            "Azure",
            format!(
                "INSTALL azure; LOAD azure; SET azure_storage_connection_string = {};",
                quote_literal(&connection_string)
            ),
        ));
    }

    settings
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!("Engine session released");
    }
}
