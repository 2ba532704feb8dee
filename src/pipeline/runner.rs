//! Job runner
//!
//! Drives one read → project → write pass through an engine session.

use crate::config::JobConfig;
use crate::database::{ReadPlan, Session, SourceLocator, SOURCE_CATALOG};
use crate::error::{Error, Phase, Result};
use crate::output::{verify_parquet_schema, Destination, OutputFormat, WritePlan};
use crate::pipeline::types::{JobReport, JobState};
use crate::schema::{map_columns, Projection, TargetSchema};
use chrono::Utc;
use std::path::Path;

/// View holding the raw source rows
pub const SOURCE_VIEW: &str = "source_rows";

/// Temporary table holding the renamed and cast rows
pub const PROJECTED_TABLE: &str = "projected";

/// Run a job in its own session
///
/// The session is released when this returns, whether the job succeeded
/// or not.
pub async fn run_job(config: &JobConfig) -> Result<JobReport> {
    let session = Session::open()?;
    run_with_session(&session, config).await
}

/// Run a job in a caller-provided session
pub async fn run_with_session(session: &Session, config: &JobConfig) -> Result<JobReport> {
    let mut runner = JobRunner::new(session, config);
    match runner.run().await {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!(
                state = %runner.state(),
                phase = %e.phase(),
                error = %e,
                "Job failed"
            );
            Err(e)
        }
    }
}

/// One job's walk through the states
pub struct JobRunner<'a> {
    session: &'a Session,
    config: &'a JobConfig,
    schema: TargetSchema,
    projection: Projection,
    state: JobState,
}

impl<'a> JobRunner<'a> {
    pub fn new(session: &'a Session, config: &'a JobConfig) -> Self {
        let (schema, projection) = map_columns(&config.columns);
        Self {
            session,
            config,
            schema,
            projection,
            state: JobState::Loaded,
        }
    }

    /// Last state reached
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Target schema of this job
    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// Run all phases in order
    pub async fn run(&mut self) -> Result<JobReport> {
        let started_at = Utc::now();
        tracing::info!(
            table = %self.config.source.table,
            columns = self.schema.len(),
            "Job loaded"
        );

        self.read()?;
        self.project()?;
        let (destination, rows_written) = self.write().await?;

        let report = JobReport {
            table: self.config.source.table.clone(),
            destination,
            format: self.config.output.format.to_lowercase(),
            partition_column: self.config.output.partition_column.clone(),
            columns: self.schema.names().iter().map(|s| (*s).to_string()).collect(),
            rows_written,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            rows = report.rows_written,
            destination = %report.destination,
            duration_ms = report.duration_ms(),
            "Job complete"
        );
        Ok(report)
    }

    /// Attach the source and bind the read
    fn read(&mut self) -> Result<()> {
        let source = &self.config.source;
        let locator = SourceLocator::resolve(&source.url, &source.user, &source.password)?;
        self.session.attach_source(&locator)?;

        let plan = ReadPlan::from_config(source);
        tracing::debug!(options = ?plan.options(), "Read plan");

        self.session
            .create_view(SOURCE_VIEW, &plan.to_sql(SOURCE_CATALOG), Phase::Read)?;

        self.advance(JobState::Read);
        Ok(())
    }

    /// Compute the projection and check it against the target schema
    fn project(&mut self) -> Result<()> {
        // Materialized so bad casts fail here, before the destination is touched
        self.session.create_table(
            PROJECTED_TABLE,
            &self.projection.apply_to(SOURCE_VIEW),
            Phase::Transform,
        )?;

        let described = self.session.describe(PROJECTED_TABLE, Phase::Transform)?;
        if described.len() != self.schema.len() {
            return Err(Error::transform(format!(
                "Projection produced {} columns, expected {}",
                described.len(),
                self.schema.len()
            )));
        }

        for ((name, engine_type), column) in described.iter().zip(self.schema.columns()) {
            if !engine_type.eq_ignore_ascii_case(column.ty.engine_type()) {
                return Err(Error::transform(format!(
                    "Column '{name}' projected as {engine_type}, expected {}",
                    column.ty.engine_type()
                )));
            }
        }

        self.advance(JobState::Projected);
        Ok(())
    }

    /// Overwrite the destination with the projected rows
    async fn write(&mut self) -> Result<(String, usize)> {
        let output = &self.config.output;
        let format: OutputFormat = output.format.parse()?;

        if let Some(column) = &output.partition_column {
            if self.schema.column(column).is_none() {
                return Err(Error::write(format!(
                    "Partition column '{column}' is not an output column"
                )));
            }
        }

        let destination = Destination::parse(&output.path)?;
        if destination.is_cloud() {
            self.session.configure_cloud_storage()?;
        }

        let removed = destination.clear().await?;
        if removed > 0 {
            tracing::info!(removed, destination = %destination.engine_root(), "Cleared existing output");
        }
        destination.prepare()?;

        let plan = WritePlan::new(
            destination.engine_root(),
            format,
            output.partition_column.clone(),
        );
        let rows = self
            .session
            .copy_to(&plan.copy_sql(PROJECTED_TABLE), PROJECTED_TABLE, Phase::Write)?;

        if format == OutputFormat::Parquet
            && plan.partition_by().is_none()
            && !destination.is_cloud()
        {
            let written = verify_parquet_schema(Path::new(&plan.target()), &self.schema)?;
            if written != rows {
                return Err(Error::write(format!(
                    "Copied {rows} rows but {} holds {written}",
                    plan.target()
                )));
            }
        }

        self.advance(JobState::Written);
        Ok((destination.engine_root(), rows))
    }

    fn advance(&mut self, to: JobState) {
        debug_assert_eq!(self.state.next(), Some(to));
        tracing::info!(from = %self.state, to = %to, "Job state");
        self.state = to;
    }
}
