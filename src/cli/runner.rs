//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ReportFormat};
use crate::config::load_job_config;
use crate::error::{Error, Result};
use crate::pipeline::run_job;
use crate::transfer::{transfer, TransferRequest};
use serde_json::{json, Value};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Some(Commands::Transfer {
                user,
                host,
                remote_dir,
                file,
                program,
            }) => {
                let request = TransferRequest::new(user, host, remote_dir, file)
                    .with_client(program, Vec::new());
                self.transfer(&request).await
            }
            None => match &self.cli.config {
                Some(path) => self.run_job(path).await,
                None => Err(Error::config("No job configuration given")),
            },
        }
    }

    async fn run_job(&self, path: &Path) -> Result<()> {
        let config = load_job_config(path)?;
        tracing::debug!(config = ?config, "Loaded job config");

        let report = run_job(&config).await?;
        self.output_message(&json!({
            "type": "JOB_COMPLETE",
            "report": report,
        }));
        Ok(())
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<()> {
        let status = transfer(request).await?;
        self.output_message(&json!({
            "type": "TRANSFER_COMPLETE",
            "remote": request.remote(),
            "exit_code": status.code(),
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            ReportFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            ReportFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
