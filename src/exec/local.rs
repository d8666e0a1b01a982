// src/exec/local.rs

//! Local command execution and file download.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{PlaybookError, Result};
use crate::exec::backend::{LocalBackend, LocalOutput};
use crate::types::BoxFuture;

/// Split a command line on whitespace into program and arguments.
///
/// There is no shell quoting: an argument containing spaces cannot be
/// expressed.
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| PlaybookError::Validation("local command is empty".to_string()))?;
    Ok((program, parts.collect()))
}

/// Production backend: `tokio::process` for commands, `reqwest` for
/// downloads.
#[derive(Debug, Clone, Default)]
pub struct SystemLocalBackend {
    http: reqwest::Client,
}

impl SystemLocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Download through a preconfigured client (proxy, user agent, timeouts).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl LocalBackend for SystemLocalBackend {
    fn run_command(
        &self,
        program: String,
        args: Vec<String>,
    ) -> BoxFuture<'_, Result<LocalOutput>> {
        Box::pin(async move {
            let output = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await
                .map_err(|e| {
                    PlaybookError::LocalCommand(format!("failed to launch '{program}': {e}"))
                })?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

            if !output.status.success() {
                let code = output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |c| c.to_string());
                return Err(PlaybookError::LocalCommand(format!(
                    "'{program}' exited with status {code}: {}",
                    stderr.trim()
                )));
            }

            Ok(LocalOutput { stdout, stderr })
        })
    }

    fn download(&self, url: String, dest: PathBuf) -> BoxFuture<'_, Result<u64>> {
        Box::pin(async move {
            let mut response = self.http.get(&url).send().await?.error_for_status()?;

            let mut file = File::create(&dest).await?;
            let mut written: u64 = 0;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;

            debug!(url = %url, dest = %dest.display(), bytes = written, "download finished");
            Ok(written)
        })
    }
}

/// Runs local commands and downloads through a [`LocalBackend`].
#[derive(Clone)]
pub struct LocalExecutor {
    backend: Arc<dyn LocalBackend>,
}

impl std::fmt::Debug for LocalExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalExecutor").finish_non_exhaustive()
    }
}

impl LocalExecutor {
    pub fn new(backend: Arc<dyn LocalBackend>) -> Self {
        Self { backend }
    }

    /// Run a whitespace-split command on this machine and echo its output.
    pub async fn run_local(&self, command: &str) -> Result<LocalOutput> {
        info!(command = %command, "execute local command");
        let (program, args) = split_command(command)?;
        let output = self.backend.run_command(program, args).await?;

        if !output.stdout.is_empty() {
            println!("{}", output.stdout.trim_end());
        }
        if !output.stderr.is_empty() {
            println!("{}", output.stderr.trim_end());
        }

        Ok(output)
    }

    /// Download `url` to `dest`. No retries, no resumption.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        info!(url = %url, location = %dest.display(), "execute download file command");
        self.backend
            .download(url.to_string(), dest.to_path_buf())
            .await
    }
}
