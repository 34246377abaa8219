//! Tempo via the aubio command-line tool (`aubio tempo`).

use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::command::run_tool;
use super::{AnalysisError, TempoAnalyzer};

#[derive(Debug, Clone)]
pub struct AubioTempo {
    program: PathBuf,
}

impl AubioTempo {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Reads the `<float> bpm` summary line aubio prints (last one wins).
pub(crate) fn parse_tempo_output(output: &str) -> Option<f64> {
    output.lines().rev().find_map(|line| {
        let mut parts = line.split_whitespace();
        let value = parts.next()?;
        let unit = parts.next()?;
        if !unit.eq_ignore_ascii_case("bpm") {
            return None;
        }
        value.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
    })
}

#[async_trait(?Send)]
impl TempoAnalyzer for AubioTempo {
    async fn estimate_bpm(&self, path: &Path) -> Result<f64> {
        let stdout = run_tool(
            &self.program,
            [OsStr::new("tempo"), OsStr::new("-i"), path.as_os_str()],
        )
        .await?;
        parse_tempo_output(&stdout).ok_or_else(|| {
            AnalysisError::UnparsableOutput {
                program: self.program.display().to_string(),
                output: stdout.trim().to_string(),
            }
            .into()
        })
    }
}
