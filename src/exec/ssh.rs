// src/exec/ssh.rs

//! `RemoteTransport` backed by the system `ssh` and `scp` binaries.
//!
//! `ssh` reports its own failures with exit status 255, the same status a
//! remote command may legitimately return. To keep the two apart the remote
//! shell appends a marker line carrying the command's real status
//! ([`wrap_command`]). When the marker is present the command ran, whatever
//! `ssh` itself exited with. When it is missing and `ssh` exited 255 the
//! session is treated as failed. A command that terminates its own shell
//! (`exit 255`) therefore still reads as a transport failure; its output is
//! kept in the error message.

use std::path::PathBuf;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::{PlaybookError, Result};
use crate::exec::backend::{RemoteTransport, SessionSpec};
use crate::types::{BoxFuture, RemoteResult};

/// `ssh` exits with 255 when the connection itself failed.
const SSH_CONNECTION_FAILURE: i32 = 255;

/// Prefix of the trailer line printed after the remote command.
pub const EXIT_MARKER: &str = "__AMBARI_PLAYBOOK_EXIT__=";

#[derive(Debug, Clone)]
pub struct SshTransport {
    ssh_program: String,
    scp_program: String,
}

impl Default for SshTransport {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
        }
    }
}

impl SshTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use other binaries than `ssh`/`scp` (e.g. a wrapper script).
    pub fn with_programs(ssh_program: impl Into<String>, scp_program: impl Into<String>) -> Self {
        Self {
            ssh_program: ssh_program.into(),
            scp_program: scp_program.into(),
        }
    }

    fn common_args(session: &SessionSpec) -> Vec<String> {
        vec![
            "-i".to_string(),
            session.key_path.display().to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", session.timeout.as_secs().max(1)),
        ]
    }

    async fn output_with_timeout(session: &SessionSpec, mut cmd: Command) -> Result<Output> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match timeout(session.timeout, cmd.output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => Err(transport_error(session, format!("failed to launch: {err}"))),
            Err(_) => Err(transport_error(
                session,
                format!("timed out after {}s", session.timeout.as_secs()),
            )),
        }
    }
}

fn transport_error(session: &SessionSpec, message: String) -> PlaybookError {
    PlaybookError::Transport {
        host: session.host.clone(),
        message,
    }
}

/// Append a POSIX-shell trailer that prints the command's exit status on
/// its own line.
pub fn wrap_command(command: &str) -> String {
    format!("{command}\nprintf '\\n{EXIT_MARKER}%d\\n' \"$?\"")
}

/// Split the exit-status trailer off `stdout`.
///
/// Returns the command's own output and status, or `None` if the trailer
/// never made it (the session failed, or the command exited its shell).
pub fn split_exit_marker(stdout: &str) -> Option<(&str, i32)> {
    let needle = format!("\n{EXIT_MARKER}");
    let idx = stdout.rfind(&needle)?;
    let code = stdout[idx + needle.len()..].trim_end().parse::<i32>().ok()?;
    Some((&stdout[..idx], code))
}

fn session_failure(session: &SessionSpec, output: &Output) -> PlaybookError {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut message = format!("ssh exited with status {SSH_CONNECTION_FAILURE}");
    for (stream, text) in [("stderr", stderr.trim()), ("stdout", stdout.trim())] {
        if !text.is_empty() {
            message.push_str(&format!("; {stream}: {text}"));
        }
    }
    transport_error(session, message)
}

fn into_remote_result(output: Output) -> RemoteResult {
    RemoteResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        done: output.status.success(),
        exit_code: output.status.code(),
    }
}

impl RemoteTransport for SshTransport {
    fn run(&self, session: SessionSpec, command: String) -> BoxFuture<'_, Result<RemoteResult>> {
        Box::pin(async move {
            let mut cmd = Command::new(&self.ssh_program);
            cmd.args(Self::common_args(&session))
                .arg("-p")
                .arg(session.port.to_string())
                .arg(format!("{}@{}", session.user, session.host))
                .arg(wrap_command(&command));

            debug!(host = %session.host, command = %command, "running remote command");
            let output = Self::output_with_timeout(&session, cmd).await?;

            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            if let Some((command_stdout, code)) = split_exit_marker(&stdout) {
                return Ok(RemoteResult {
                    stdout: command_stdout.to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    done: code == 0,
                    exit_code: Some(code),
                });
            }

            if output.status.code() == Some(SSH_CONNECTION_FAILURE) {
                return Err(session_failure(&session, &output));
            }

            Ok(into_remote_result(output))
        })
    }

    fn copy(
        &self,
        session: SessionSpec,
        source: PathBuf,
        target: String,
    ) -> BoxFuture<'_, Result<RemoteResult>> {
        Box::pin(async move {
            let mut cmd = Command::new(&self.scp_program);
            cmd.args(Self::common_args(&session))
                .arg("-P")
                .arg(session.port.to_string())
                .arg(&source)
                .arg(format!("{}@{}:{}", session.user, session.host, target));

            debug!(
                host = %session.host,
                source = %source.display(),
                target = %target,
                "copying file to remote host"
            );
            let output = Self::output_with_timeout(&session, cmd).await?;

            // Any scp failure means the file did not land on the host.
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(transport_error(
                    &session,
                    format!("scp failed: {}", stderr.trim()),
                ));
            }

            Ok(into_remote_result(output))
        })
    }
}
