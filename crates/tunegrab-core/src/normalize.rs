//! Post-extraction file fixes: extension reconciliation and name sanitization.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::naming::sanitize_os_file_name;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Neither the expected file nor any fallback exists.
    #[error("File not found: {}", expected.display())]
    FileMissing { expected: PathBuf },
    #[error("path has no file name: {}", path.display())]
    NoFileName { path: PathBuf },
}

/// The downloaded file after renaming to its encoded name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedFile {
    pub path: PathBuf,
    pub file_name: String,
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// `<base>.<format>`, where `<base>` is `reported` minus its extension.
pub fn expected_path(reported: &Path, target_format: &str) -> PathBuf {
    reported.with_extension(target_format)
}

/// Makes sure the transcoded file sits at `<base>.<target_format>`.
///
/// If it is missing, `<base>.<ext>` is tried for each fallback extension in
/// order and the first hit is renamed to the expected path, whatever codec it
/// actually holds. Only one level of fallback; no retries.
pub async fn reconcile_extension(
    reported: &Path,
    target_format: &str,
    fallback_extensions: &[String],
) -> Result<PathBuf> {
    let expected = expected_path(reported, target_format);
    if is_regular_file(&expected).await {
        return Ok(expected);
    }

    for ext in fallback_extensions {
        let candidate = reported.with_extension(ext);
        if candidate == expected || !is_regular_file(&candidate).await {
            continue;
        }
        if !ext.eq_ignore_ascii_case(target_format) {
            tracing::warn!(
                from = %candidate.display(),
                to = %expected.display(),
                "renaming fallback file to requested extension; codec may not match"
            );
        }
        tokio::fs::rename(&candidate, &expected)
            .await
            .with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    candidate.display(),
                    expected.display()
                )
            })?;
        return Ok(expected);
    }

    Err(NormalizeError::FileMissing { expected }.into())
}

/// Renames `path` in place to its percent-encoded file name.
pub async fn rename_to_sanitized(path: &Path) -> Result<SanitizedFile> {
    let original = path.file_name().ok_or_else(|| NormalizeError::NoFileName {
        path: path.to_path_buf(),
    })?;
    let file_name = sanitize_os_file_name(original);
    let sanitized = path.with_file_name(&file_name);

    if sanitized != path {
        tokio::fs::rename(path, &sanitized).await.with_context(|| {
            format!(
                "failed to rename {} to {}",
                path.display(),
                sanitized.display()
            )
        })?;
        tracing::debug!(from = %path.display(), to = %sanitized.display(), "sanitized file name");
    }

    Ok(SanitizedFile {
        path: sanitized,
        file_name,
    })
}
