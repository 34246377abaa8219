//! Logging init.
//!
//! stdout carries progress lines and the final `RESULT_FILE:` line, and stderr
//! carries the proxy/sweep diagnostics and the `ERROR:` line callers scrape.
//! Tracing output therefore goes to a file under the XDG state dir and only
//! falls back to stderr, silenced by default, when that file cannot be opened.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "tunegrab.log";

/// Filter used for the log file when `RUST_LOG` is unset.
pub const FILE_DEFAULT_FILTER: &str = "info,tunegrab=debug,tunegrab_core=debug";

/// Filter used for the stderr fallback when `RUST_LOG` is unset. Nothing may
/// precede the `ERROR:` line, so events are opt-in there.
pub const STDERR_DEFAULT_FILTER: &str = "off";

/// Log record sink: the log file, or stderr if the handle could not be cloned.
enum LogSink {
    File(fs::File),
    Stderr,
}

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogSink::File(f) => f.write(buf),
            LogSink::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogSink::File(f) => f.flush(),
            LogSink::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFileWriter(fs::File);

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogSink::File)
            .unwrap_or(LogSink::Stderr)
    }
}

/// `$XDG_STATE_HOME/tunegrab/tunegrab.log`, creating the directory.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs =
        xdg::BaseDirectories::with_prefix("tunegrab").context("resolve XDG base directories")?;
    xdg_dirs
        .place_state_file(LOG_FILE_NAME)
        .context("create tunegrab state directory")
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Send tracing output to the log file. Errors leave no subscriber installed,
/// so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_or(FILE_DEFAULT_FILTER))
        .with_writer(BoxMakeWriter::new(LogFileWriter(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(())
}

/// Stderr fallback. Silent unless `RUST_LOG` asks for output.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or(STDERR_DEFAULT_FILTER))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn stderr_fallback_is_silent_by_default() {
        let filter = EnvFilter::new(STDERR_DEFAULT_FILTER);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::OFF));
    }

    #[test]
    fn file_filter_keeps_crate_debug_events() {
        let filter = EnvFilter::new(FILE_DEFAULT_FILTER);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
