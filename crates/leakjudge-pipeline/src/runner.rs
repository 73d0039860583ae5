//! External command execution for the command-backed stages.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::error::{PipelineError, Result};

/// Result of one command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success, -1 when killed by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether the process reported success.
    pub success: bool,
}

impl CommandResult {
    /// Whether the command passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// Turn a non-zero exit into [`PipelineError::StageExit`].
    pub fn into_passed(self) -> Result<Self> {
        if self.passed() {
            Ok(self)
        } else {
            Err(PipelineError::StageExit {
                stage: self.stage_name,
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs a stage command and captures its output.
pub struct CommandRunner;

impl CommandRunner {
    /// Execute `command` (first element is the executable).
    ///
    /// `timeout_secs == 0` waits indefinitely. A timed-out child is killed.
    pub async fn execute(stage_name: &str, command: &[String], timeout_secs: u64) -> Result<CommandResult> {
        let start = Instant::now();

        let (exe, args) = command
            .split_first()
            .ok_or_else(|| PipelineError::EmptyCommand {
                stage: stage_name.to_string(),
            })?;

        let spawn_err = |source: std::io::Error| PipelineError::Spawn {
            stage: stage_name.to_string(),
            source,
        };

        let child = Command::new(exe)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        let output = if timeout_secs > 0 {
            tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
                .await
                .map_err(|_| PipelineError::Timeout {
                    stage: stage_name.to_string(),
                    secs: timeout_secs,
                })?
                .map_err(spawn_err)?
        } else {
            child.wait_with_output().await.map_err(spawn_err)?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(CommandResult {
            stage_name: stage_name.to_string(),
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
            success: output.status.success(),
        })
    }
}
