//! Line protocol spoken by the yt-dlp backend on stdout.
//!
//! yt-dlp is told (via `--progress-template` and `--print`) to prefix the
//! lines we care about with a marker. Anything else is passed through as
//! [`ExtractorLine::Other`].

use std::path::PathBuf;

use super::{ProgressEvent, ProgressStatus};

pub const PROGRESS_MARKER: &str = "[tunegrab:progress]";
pub const TITLE_MARKER: &str = "[tunegrab:title]";
pub const FILEPATH_MARKER: &str = "[tunegrab:filepath]";

/// Field separator inside a progress line.
pub(crate) const FIELD_SEP: char = '\t';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorLine {
    Progress(ProgressEvent),
    Title(String),
    FilePath(PathBuf),
    Other(String),
}

/// Template for `--progress-template download:<template>`.
pub(crate) fn progress_template() -> String {
    format!(
        "{PROGRESS_MARKER}%(progress.status)s{FIELD_SEP}%(progress._percent_str)s{FIELD_SEP}%(progress._speed_str)s{FIELD_SEP}%(progress._eta_str)s"
    )
}

pub(crate) fn title_template() -> String {
    format!("{TITLE_MARKER}%(title)s")
}

pub(crate) fn filepath_template() -> String {
    format!("{FILEPATH_MARKER}%(filepath)s")
}

/// Classify one stdout line (without trailing newline).
pub fn parse_line(line: &str) -> ExtractorLine {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(rest) = line.strip_prefix(PROGRESS_MARKER) {
        let mut fields = rest.split(FIELD_SEP).map(str::trim);
        let status = ProgressStatus::parse(fields.next().unwrap_or_default());
        let percent = fields.next().unwrap_or_default().to_string();
        let speed = fields.next().unwrap_or_default().to_string();
        let eta = fields.next().unwrap_or_default().to_string();
        return ExtractorLine::Progress(ProgressEvent {
            status,
            percent,
            speed,
            eta,
        });
    }
    if let Some(title) = line.strip_prefix(TITLE_MARKER) {
        return ExtractorLine::Title(title.to_string());
    }
    if let Some(path) = line.strip_prefix(FILEPATH_MARKER) {
        return ExtractorLine::FilePath(PathBuf::from(path));
    }
    ExtractorLine::Other(line.to_string())
}
