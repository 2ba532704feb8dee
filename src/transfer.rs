//! File upload through an interactive SFTP client
//!
//! The client is driven in batch mode: a `put`/`bye` script is piped to its
//! stdin. Authentication is left to the client (keys, agent, ssh config).

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Client used when none is given
pub const DEFAULT_PROGRAM: &str = "sftp";

/// One file to upload
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub user: String,
    pub host: String,
    pub remote_dir: String,
    pub local_file: PathBuf,
    /// Client executable
    pub program: String,
    /// Arguments placed before `user@host`
    pub program_args: Vec<String>,
}

impl TransferRequest {
    pub fn new(
        user: impl Into<String>,
        host: impl Into<String>,
        remote_dir: impl Into<String>,
        local_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
            remote_dir: remote_dir.into(),
            local_file: local_file.into(),
            program: DEFAULT_PROGRAM.to_string(),
            program_args: Vec::new(),
        }
    }

    /// Use a different client executable
    #[must_use]
    pub fn with_client(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.program_args = args;
        self
    }

    /// `user@host`
    pub fn remote(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Commands fed to the client
    pub fn batch_script(&self) -> String {
        format!(
            "put {} {}\nbye\n",
            quote_arg(&self.local_file.to_string_lossy()),
            quote_arg(&self.remote_dir)
        )
    }
}

/// Double-quote an sftp batch argument
fn quote_arg(arg: &str) -> String {
    format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Run the client and wait for it
///
/// The exit status is logged and returned as-is; a non-zero status is not
/// an error here. Only a client that cannot be started is.
pub async fn transfer(request: &TransferRequest) -> Result<ExitStatus> {
    let remote = request.remote();
    tracing::info!(
        program = %request.program,
        remote = %remote,
        file = %request.local_file.display(),
        remote_dir = %request.remote_dir,
        "Starting transfer"
    );

    let mut child = Command::new(&request.program)
        .args(&request.program_args)
        .arg(&remote)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| Error::transfer(format!("Failed to start '{}': {e}", request.program)))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(request.batch_script().as_bytes()).await {
            tracing::warn!(error = %e, "Client closed its input early");
        }
        // Dropping stdin sends EOF
    }

    let status = child
        .wait()
        .await
        .map_err(|e| Error::transfer(format!("Failed to wait for '{}': {e}", request.program)))?;

    tracing::info!(status = %status, "Transfer finished");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_batch_script() {
        let request = TransferRequest::new("etl", "files.example.com", "/incoming", "/tmp/report.csv");

        assert_eq!(request.remote(), "etl@files.example.com");
        assert_eq!(request.program, "sftp");
        assert_eq!(
            request.batch_script(),
            "put \"/tmp/report.csv\" \"/incoming\"\nbye\n"
        );
    }

    #[test]
    fn test_batch_script_quotes_paths_with_spaces() {
        let request = TransferRequest::new(
            "etl",
            "files.example.com",
            "/drop box/in",
            "/tmp/q1 \"final\".csv",
        );

        assert_eq!(
            request.batch_script(),
            "put \"/tmp/q1 \\\"final\\\".csv\" \"/drop box/in\"\nbye\n"
        );
    }

    #[tokio::test]
    async fn test_client_receives_remote_and_script() {
        let temp = tempfile::tempdir().unwrap();
        let capture = temp.path().join("capture");

        // $0 is the capture path, $1 is user@host
        let request = TransferRequest::new("etl", "sftp.local", "/in", "/tmp/a.parquet").with_client(
            "sh",
            vec![
                "-c".to_string(),
                r#"printf '%s\n' "$1" > "$0.args"; cat > "$0.stdin""#.to_string(),
                capture.to_str().unwrap().to_string(),
            ],
        );

        let status = transfer(&request).await.unwrap();
        assert!(status.success());

        let args = std::fs::read_to_string(temp.path().join("capture.args")).unwrap();
        assert_eq!(args, "etl@sftp.local\n");
        let stdin = std::fs::read_to_string(temp.path().join("capture.stdin")).unwrap();
        assert_eq!(stdin, "put \"/tmp/a.parquet\" \"/in\"\nbye\n");
    }

    #[tokio::test]
    async fn test_failing_client_status_is_returned() {
        let request = TransferRequest::new("u", "h", "/d", "f")
            .with_client("sh", vec!["-c".to_string(), "exit 3".to_string()]);

        let status = transfer(&request).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_missing_client_is_transfer_error() {
        let request = TransferRequest::new("u", "h", "/d", "f")
            .with_client("tablecast-no-such-client", Vec::new());

        let err = transfer(&request).await.unwrap_err();
        assert_eq!(err.phase(), Phase::Transfer);
    }
}
