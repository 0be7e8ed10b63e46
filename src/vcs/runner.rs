use std::process::Output;

use tokio::process::Command;
use tracing::{debug, warn};

use super::JjCli;
use crate::error::GraftError;

const NO_REPO_MARKER: &str = "There is no jj repo";

impl JjCli {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--no-pager")
            .arg("--color=never")
            .arg("-R")
            .arg(&self.root);
        cmd
    }

    /// Runs `jj <args>` against the repository and returns stdout.
    pub(super) async fn run(&self, args: &[&str]) -> Result<String, GraftError> {
        let mut cmd = self.command();
        cmd.args(args);
        let output = self.output(cmd, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub(super) async fn run_mutation(&self, args: &[&str]) -> Result<(), GraftError> {
        self.run(args).await.map(|_| ())
    }

    pub(super) async fn init_colocated(&self) -> Result<(), GraftError> {
        let args = ["git", "init", "--colocate"];
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--no-pager").args(args).current_dir(&self.root);
        self.output(cmd, &args).await.map(|_| ())
    }

    async fn output(&self, mut cmd: Command, args: &[&str]) -> Result<Output, GraftError> {
        let label = command_label(&self.bin, args);
        debug!(command = %label, "running jj");
        let output = cmd.output().await.map_err(|err| GraftError::ExternalTool {
            command: label.clone(),
            message: if err.kind() == std::io::ErrorKind::NotFound {
                format!("`{}` not found on PATH", self.bin)
            } else {
                err.to_string()
            },
        })?;

        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(NO_REPO_MARKER) {
            return Err(GraftError::NotManagedRepository {
                path: self.root.clone(),
            });
        }
        let message = diagnostic_message(&stderr)
            .unwrap_or_else(|| format!("exited with {}", output.status));
        warn!(command = %label, %message, "jj failed");
        Err(GraftError::ExternalTool {
            command: label,
            message,
        })
    }
}

fn command_label(bin: &str, args: &[&str]) -> String {
    let mut label = bin.to_string();
    for arg in args.iter().take(3) {
        label.push(' ');
        label.push_str(arg);
    }
    label
}

/// Picks the most useful line from a failed invocation's stderr.
pub(crate) fn diagnostic_message(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if let Some(err) = lines.iter().find(|l| l.starts_with("Error:")) {
        return Some(err.trim_start_matches("Error:").trim().to_string());
    }
    lines.last().map(|l| l.to_string())
}
