//! Result descriptor handed to the invoking process.
//!
//! A successful download writes `result_<unix_timestamp>.json` into the
//! working directory and prints `RESULT_FILE:<path>` as its last stdout line.
//! The caller owns the descriptor from then on.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of the single machine-readable stdout line.
pub const RESULT_PREFIX: &str = "RESULT_FILE:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    pub title: String,
    /// Absolute path of the downloaded audio file.
    pub file_path: PathBuf,
    /// Percent-encoded base name; equals the base name of `file_path`.
    pub file_name: String,
}

/// `result_<secs>.json` for the given wall-clock time.
pub fn result_file_name(now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("result_{secs}.json")
}

/// Serializes `result` into `dir` and returns the descriptor's path.
pub async fn write_result_file(dir: &Path, result: &DownloadResult, now: SystemTime) -> Result<PathBuf> {
    let path = dir.join(result_file_name(now));
    let json = serde_json::to_vec(result).context("serialize download result")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write result file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote result file");
    Ok(path)
}

pub async fn read_result_file(path: &Path) -> Result<DownloadResult> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read result file: {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse result file: {}", path.display()))
}

pub fn format_result_line(path: &Path) -> String {
    format!("{RESULT_PREFIX}{}", path.display())
}

/// Path from the last `RESULT_FILE:` line of captured stdout; earlier ones
/// (and progress chatter) are ignored.
pub fn last_result_file(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .rev()
        .find_map(|l| l.trim_end().strip_prefix(RESULT_PREFIX))
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}
