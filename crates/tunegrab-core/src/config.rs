use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the proxy for the extractor.
/// Read only at the process entry point; see [`TunegrabConfig::resolve_proxy`].
pub const PROXY_ENV_VAR: &str = "YT_DLP_PROXY_URL";

/// Extractor backend (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Program to run (name on `PATH` or absolute path).
    pub program: String,
    /// Extra arguments appended before the URL (e.g. `--cookies`, `--ffmpeg-location`).
    pub extra_args: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Analysis backends (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// aubio command-line tool, used as `<tempo_program> tempo -i <file>`.
    pub tempo_program: String,
    /// libkeyfinder CLI, used as `<key_program> <file>`.
    pub key_program: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tempo_program: "aubio".to_string(),
            key_program: "keyfinder-cli".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/tunegrab/config.toml`.
/// Every key is optional; missing ones take the defaults below.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TunegrabConfig {
    /// Files in the output directory older than this are deleted before each download.
    pub stale_age_secs: u64,
    /// Transcode quality handed to the extractor (kbps for lossy codecs).
    pub audio_quality: String,
    /// Extensions tried, in order, when the transcoded file is not where expected.
    pub fallback_extensions: Vec<String>,
    /// Working directory for downloads and result files (None = OS temp dir).
    pub output_dir: Option<PathBuf>,
    /// Proxy used when the environment does not provide one.
    pub proxy_url: Option<String>,
    pub extractor: ExtractorConfig,
    pub analysis: AnalysisConfig,
}

impl Default for TunegrabConfig {
    fn default() -> Self {
        Self {
            stale_age_secs: 3600,
            audio_quality: "192".to_string(),
            fallback_extensions: vec!["m4a".to_string()],
            output_dir: None,
            proxy_url: None,
            extractor: ExtractorConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

// Proxy URLs may embed credentials; keep them out of logs.
impl fmt::Debug for TunegrabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunegrabConfig")
            .field("stale_age_secs", &self.stale_age_secs)
            .field("audio_quality", &self.audio_quality)
            .field("fallback_extensions", &self.fallback_extensions)
            .field("output_dir", &self.output_dir)
            .field("proxy_url", &self.proxy_url.as_ref().map(|_| "<redacted>"))
            .field("extractor", &self.extractor)
            .field("analysis", &self.analysis)
            .finish()
    }
}

impl TunegrabConfig {
    pub fn stale_age(&self) -> Duration {
        Duration::from_secs(self.stale_age_secs)
    }

    /// Directory the pipeline works in.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Environment value wins over the configured proxy; empty values count as unset.
    pub fn resolve_proxy(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.is_empty())
            .or_else(|| self.proxy_url.clone().filter(|v| !v.is_empty()))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs =
        xdg::BaseDirectories::with_prefix("tunegrab").context("resolve XDG base directories")?;
    xdg_dirs
        .place_config_file("config.toml")
        .context("create tunegrab config directory")
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TunegrabConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<TunegrabConfig> {
    if !path.exists() {
        let default_cfg = TunegrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        fs::write(path, toml)
            .with_context(|| format!("write default config {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: TunegrabConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Like [`load_or_init`], but a missing or broken config never stops a run:
/// the problem is logged and the defaults are used.
pub fn load_or_default() -> TunegrabConfig {
    or_default(load_or_init())
}

fn or_default(loaded: Result<TunegrabConfig>) -> TunegrabConfig {
    match loaded {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "config unavailable, using defaults");
            TunegrabConfig::default()
        }
    }
}
