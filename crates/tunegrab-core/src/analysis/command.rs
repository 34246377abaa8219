//! Runs an analysis program to completion and returns its stdout.

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::AnalysisError;

pub(super) async fn run_tool<I, S>(program: &Path, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("failed to spawn {}", program.display()))?;

    let name = program.display().to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(String::from)
            .unwrap_or_else(|| format!("exited with {}", output.status));
        return Err(AnalysisError::ToolFailed {
            program: name,
            message,
        }
        .into());
    }

    tracing::debug!(program = %name, "analysis tool finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
