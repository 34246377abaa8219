//! Stale-file sweep of the shared working directory.
//!
//! Every download starts by deleting regular files older than the age
//! threshold (old downloads and result descriptors other processes never
//! collected). Per-file failures are collected, not propagated, so one locked
//! or already-removed file cannot abort an unrelated download.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A file the sweep tried and failed to delete.
#[derive(Debug)]
pub struct SweepFailure {
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Outcome of one sweep.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<SweepFailure>,
}

/// Removal step of the sweep. [`remove_file`] unless a caller needs
/// removals to fail.
pub type RemoveFn = fn(&Path) -> std::io::Result<()>;

pub fn remove_file(path: &Path) -> std::io::Result<()> {
    std::fs::remove_file(path)
}

/// True if a file last modified at `modified` is older than `max_age` at `now`.
/// Files stamped in the future are never stale.
pub fn is_stale(modified: SystemTime, now: SystemTime, max_age: Duration) -> bool {
    now.duration_since(modified)
        .map(|age| age > max_age)
        .unwrap_or(false)
}

/// Deletes regular files in `dir` (not recursive) whose mtime is older than `max_age`.
///
/// Fails only if `dir` itself cannot be listed.
pub async fn sweep_stale_files(dir: &Path, max_age: Duration, now: SystemTime) -> Result<SweepReport> {
    sweep_stale_files_with(dir, max_age, now, remove_file).await
}

pub async fn sweep_stale_files_with(
    dir: &Path,
    max_age: Duration,
    now: SystemTime,
    remove: RemoveFn,
) -> Result<SweepReport> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("list directory {}", dir.display()))?;

    let mut report = SweepReport::default();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "read_dir entry failed, skipping");
                continue;
            }
        };
        let path = entry.path();
        // Follows symlinks, like a plain stat.
        let meta = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "stat failed, skipping");
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let modified = match meta.modified() {
            Ok(t) => t,
            Err(_) => continue,
        };
        if !is_stale(modified, now, max_age) {
            continue;
        }
        match remove(&path) {
            Ok(()) => report.removed.push(path),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "failed to remove stale file");
                report.failed.push(SweepFailure { path, error });
            }
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        removed = report.removed.len(),
        failed = report.failed.len(),
        "stale-file sweep done"
    );
    Ok(report)
}
