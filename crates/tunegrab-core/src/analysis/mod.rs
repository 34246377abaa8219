//! Tempo and key estimation.
//!
//! Estimation itself is delegated to external programs behind the
//! [`TempoAnalyzer`] and [`KeyAnalyzer`] traits; this module owns the
//! argument handling and the JSON reports printed by the CLI.

mod aubio;
mod command;
mod keyfinder;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use aubio::AubioTempo;
pub use keyfinder::KeyFinderCli;

pub const DEFAULT_MIN_BPM: f64 = 50.0;
pub const DEFAULT_MAX_BPM: f64 = 100.0;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("audio file not found: {}", path.display())]
    InputMissing { path: std::path::PathBuf },
    #[error("invalid BPM range: min {min} must be positive and below max {max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("{program} failed: {message}")]
    ToolFailed { program: String, message: String },
    #[error("could not parse {program} output: {output:?}")]
    UnparsableOutput { program: String, output: String },
}

/// Accepted tempo window. Estimates outside it are folded by octaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmRange {
    pub min: f64,
    pub max: f64,
}

impl Default for BpmRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_BPM,
            max: DEFAULT_MAX_BPM,
        }
    }
}

impl BpmRange {
    pub fn new(min: f64, max: f64) -> Result<Self, AnalysisError> {
        if !(min > 0.0 && min < max && max.is_finite()) {
            return Err(AnalysisError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Doubles or halves `bpm` until it lies in the range. When the range is
    /// narrower than an octave and no multiple fits, the closer bound wins.
    pub fn fold(&self, bpm: f64) -> f64 {
        if !bpm.is_finite() || bpm <= 0.0 {
            return bpm;
        }
        let mut v = bpm;
        while v < self.min {
            v *= 2.0;
        }
        while v > self.max {
            v /= 2.0;
        }
        if v >= self.min {
            return v;
        }
        // v < min after halving: the window has no octave of bpm in it.
        let up = v * 2.0;
        if (self.min - v) <= (up - self.max) {
            self.min
        } else {
            self.max
        }
    }
}

/// Rounds to 3 decimals, as reported in `{"bpm": ...}`.
pub fn round_bpm(bpm: f64) -> f64 {
    (bpm * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoReport {
    pub bpm: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyReport {
    pub key: String,
}

/// Raw tempo estimate of a whole file, in beats per minute.
#[async_trait(?Send)]
pub trait TempoAnalyzer {
    async fn estimate_bpm(&self, path: &Path) -> Result<f64>;
}

/// Musical key of a whole file (e.g. `Am`, `F#`).
#[async_trait(?Send)]
pub trait KeyAnalyzer {
    async fn estimate_key(&self, path: &Path) -> Result<String>;
}

async fn ensure_input(path: &Path) -> Result<()> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(AnalysisError::InputMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

/// Estimates tempo, folds it into `range` and rounds it.
pub async fn analyze_tempo<A: TempoAnalyzer + ?Sized>(
    analyzer: &A,
    path: &Path,
    range: BpmRange,
) -> Result<TempoReport> {
    ensure_input(path).await?;
    let raw = analyzer.estimate_bpm(path).await?;
    let bpm = round_bpm(range.fold(raw));
    tracing::info!(path = %path.display(), raw, bpm, "tempo estimated");
    Ok(TempoReport { bpm })
}

pub async fn analyze_key<A: KeyAnalyzer + ?Sized>(analyzer: &A, path: &Path) -> Result<KeyReport> {
    ensure_input(path).await?;
    let key = analyzer.estimate_key(path).await?;
    tracing::info!(path = %path.display(), key = %key, "key estimated");
    Ok(KeyReport { key })
}
