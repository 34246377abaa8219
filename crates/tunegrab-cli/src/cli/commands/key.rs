//! `tunegrab key <file>` – musical key as JSON.

use anyhow::Result;
use std::path::Path;
use tunegrab_core::analysis::{self, KeyFinderCli};
use tunegrab_core::config::TunegrabConfig;

pub async fn run_key(cfg: &TunegrabConfig, path: &Path) -> Result<()> {
    let analyzer = KeyFinderCli::new(&cfg.analysis.key_program);
    let report = analysis::analyze_key(&analyzer, path).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
