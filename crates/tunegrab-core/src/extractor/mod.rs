//! Extractor interface for turning a media URL into a local audio file.
//!
//! The pipeline only depends on this trait and does not know about yt-dlp
//! or any other specific extraction program.

mod protocol;
mod ytdlp;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use protocol::{parse_line, ExtractorLine, PROGRESS_MARKER, TITLE_MARKER, FILEPATH_MARKER};
pub use ytdlp::YtDlp;

/// Quality target handed to the transcoder unless configured otherwise.
pub const DEFAULT_AUDIO_QUALITY: &str = "192";

/// Everything the extractor needs for one download.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub url: String,
    /// Codec to transcode to (e.g. `mp3`, `aac`, `m4a`).
    pub audio_format: String,
    pub audio_quality: String,
    /// Output path template, e.g. `/tmp/%(title)s.%(ext)s`.
    pub output_template: String,
    /// Already percent-encoded proxy URL.
    pub proxy: Option<String>,
}

/// What the extractor reports after a successful download and transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMedia {
    pub title: String,
    /// Path the extractor says it produced. Only its stem is trusted; the
    /// extension may be stale when the transcode step renamed the file.
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Error,
    Other,
}

impl ProgressStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "downloading" => ProgressStatus::Downloading,
            "finished" => ProgressStatus::Finished,
            "error" => ProgressStatus::Error,
            _ => ProgressStatus::Other,
        }
    }
}

/// One progress tick, with the extractor's own human-readable strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub percent: String,
    pub speed: String,
    pub eta: String,
}

/// The extractor could not resolve, download or transcode the source.
/// The message is the extractor's own, without its `ERROR:` prefix.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExtractError {
    pub message: String,
}

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Progress callback handed to [`Extractor::extract`].
pub type ProgressFn<'a> = dyn FnMut(&ProgressEvent) + 'a;

/// Trait implemented by extraction backends.
///
/// Expected failures from the source (unsupported URL, network, codec) are
/// returned as [`ExtractError`] inside the `anyhow::Error` so callers can
/// downcast; anything else (e.g. the program is not installed) is a plain error.
#[async_trait(?Send)]
pub trait Extractor {
    async fn extract(
        &self,
        request: &ExtractRequest,
        on_progress: &mut ProgressFn<'_>,
    ) -> anyhow::Result<ExtractedMedia>;
}
