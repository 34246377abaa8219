//! CLI for tunegrab: one subcommand per tool, positional arguments only.

mod commands;
pub mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::Path;
use tunegrab_core::analysis::{DEFAULT_MAX_BPM, DEFAULT_MIN_BPM};
use tunegrab_core::config;

use commands::{run_bpm, run_download, run_key};

/// Top-level CLI for tunegrab.
#[derive(Debug, Parser)]
#[command(name = "tunegrab")]
#[command(about = "tunegrab: download audio from a URL and estimate its tempo and key", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download audio from a URL, transcode it and print `RESULT_FILE:<path>`.
    Download {
        /// Media page URL understood by yt-dlp.
        url: String,
        /// Target audio codec (e.g. mp3, aac, m4a, opus).
        format: String,
    },

    /// Estimate the tempo of an audio file and print `{"bpm": ...}`.
    Bpm {
        /// Path to the audio file.
        path: String,
        /// Lowest acceptable tempo.
        #[arg(default_value_t = DEFAULT_MIN_BPM)]
        min_bpm: f64,
        /// Highest acceptable tempo.
        #[arg(default_value_t = DEFAULT_MAX_BPM)]
        max_bpm: f64,
    },

    /// Estimate the musical key of an audio file and print `{"key": ...}`.
    Key {
        /// Path to the audio file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_default();
        tracing::debug!(
            output_dir = %cfg.output_dir().display(),
            stale_age_secs = cfg.stale_age_secs,
            extractor = %cfg.extractor.program,
            proxy_configured = cfg.proxy_url.is_some(),
            "config loaded"
        );

        match cli.command {
            CliCommand::Download { url, format } => run_download(&cfg, &url, &format).await?,
            CliCommand::Bpm {
                path,
                min_bpm,
                max_bpm,
            } => run_bpm(&cfg, Path::new(&path), min_bpm, max_bpm).await?,
            CliCommand::Key { path } => run_key(&cfg, Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
