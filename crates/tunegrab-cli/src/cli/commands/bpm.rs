//! `tunegrab bpm <file> [min_bpm] [max_bpm]` – tempo estimate as JSON.

use anyhow::Result;
use std::path::Path;
use tunegrab_core::analysis::{self, AubioTempo, BpmRange};
use tunegrab_core::config::TunegrabConfig;

pub async fn run_bpm(cfg: &TunegrabConfig, path: &Path, min_bpm: f64, max_bpm: f64) -> Result<()> {
    let range = BpmRange::new(min_bpm, max_bpm)?;
    let analyzer = AubioTempo::new(&cfg.analysis.tempo_program);
    let report = analysis::analyze_tempo(&analyzer, path, range).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
