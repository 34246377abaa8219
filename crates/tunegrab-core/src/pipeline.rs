//! Download-normalize pipeline.
//!
//! One run: sweep stale files, extract + transcode via the [`Extractor`],
//! reconcile the extension, percent-encode the file name, write the result
//! descriptor and print `RESULT_FILE:<path>`.
//!
//! `out` is the primary channel (progress lines and the final result line);
//! `side` receives proxy and sweep diagnostics.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::config::TunegrabConfig;
use crate::extractor::{ExtractRequest, Extractor, ProgressEvent, ProgressStatus};
use crate::naming::encode_proxy_url;
use crate::normalize;
use crate::result::{self, DownloadResult};
use crate::sweep;

/// What to download and which codec to end up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub target_format: String,
}

impl DownloadRequest {
    /// Rejects empty values; codec support is left to the extractor.
    pub fn new(url: impl Into<String>, target_format: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let target_format = target_format.into();
        if url.trim().is_empty() {
            anyhow::bail!("url must not be empty");
        }
        if target_format.trim().is_empty() {
            anyhow::bail!("format must not be empty");
        }
        Ok(Self { url, target_format })
    }
}

/// Explicit pipeline inputs, resolved at the process entry point.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_dir: PathBuf,
    pub stale_age: Duration,
    pub audio_quality: String,
    pub fallback_extensions: Vec<String>,
    /// Raw proxy URL; encoded right before use.
    pub proxy: Option<String>,
}

impl PipelineSettings {
    pub fn from_config(cfg: &TunegrabConfig, proxy: Option<String>) -> Self {
        Self {
            output_dir: cfg.output_dir(),
            stale_age: cfg.stale_age(),
            audio_quality: cfg.audio_quality.clone(),
            fallback_extensions: cfg.fallback_extensions.clone(),
            proxy,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result_file: PathBuf,
    pub result: DownloadResult,
}

pub struct Pipeline<E> {
    extractor: E,
    settings: PipelineSettings,
    remove: sweep::RemoveFn,
}

fn output_template(dir: &Path) -> String {
    // `%` in the directory would otherwise be read as a template field.
    let dir = dir.to_string_lossy().replace('%', "%%");
    format!("{}/%(title)s.%(ext)s", dir.trim_end_matches('/'))
}

pub(crate) fn progress_line(ev: &ProgressEvent) -> Option<String> {
    if ev.status != ProgressStatus::Downloading {
        return None;
    }
    Some(format!(
        "Downloading: {} at {} ETA {}",
        ev.percent, ev.speed, ev.eta
    ))
}

impl<E: Extractor> Pipeline<E> {
    pub fn new(extractor: E, settings: PipelineSettings) -> Self {
        Self {
            extractor,
            settings,
            remove: sweep::remove_file,
        }
    }

    /// Replaces the file removal used by the stale-file sweep.
    pub fn with_sweep_remover(mut self, remove: sweep::RemoveFn) -> Self {
        self.remove = remove;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Runs the whole pipeline once. No result file is written on error.
    pub async fn run(
        &self,
        request: &DownloadRequest,
        out: &mut dyn Write,
        side: &mut dyn Write,
    ) -> Result<PipelineOutcome> {
        let dir = tokio::fs::canonicalize(&self.settings.output_dir)
            .await
            .with_context(|| {
                format!(
                    "output directory unavailable: {}",
                    self.settings.output_dir.display()
                )
            })?;

        let report = sweep::sweep_stale_files_with(
            &dir,
            self.settings.stale_age,
            SystemTime::now(),
            self.remove,
        )
        .await?;
        for failure in &report.failed {
            writeln!(
                side,
                "Failed to remove file: {}, error: {}",
                failure.path.display(),
                failure.error
            )?;
        }

        let proxy = self.settings.proxy.as_deref().map(encode_proxy_url);
        match &proxy {
            Some(p) => writeln!(side, "Attempting download with proxy: {p}")?,
            None => writeln!(side, "No proxy configured")?,
        }

        let extract_request = ExtractRequest {
            url: request.url.clone(),
            audio_format: request.target_format.clone(),
            audio_quality: self.settings.audio_quality.clone(),
            output_template: output_template(&dir),
            proxy,
        };
        let media = {
            let mut on_progress = |ev: &ProgressEvent| {
                if let Some(line) = progress_line(ev) {
                    // Progress is best-effort; a closed stdout must not kill the download.
                    let _ = writeln!(out, "{line}");
                    let _ = out.flush();
                }
            };
            self.extractor
                .extract(&extract_request, &mut on_progress)
                .await?
        };

        let final_path = normalize::reconcile_extension(
            &media.output_path,
            &request.target_format,
            &self.settings.fallback_extensions,
        )
        .await?;
        let sanitized = normalize::rename_to_sanitized(&final_path).await?;

        let result = DownloadResult {
            title: media.title,
            file_path: sanitized.path,
            file_name: sanitized.file_name,
        };
        let result_file = result::write_result_file(&dir, &result, SystemTime::now()).await?;

        writeln!(out, "{}", result::format_result_line(&result_file))?;
        out.flush()?;

        Ok(PipelineOutcome {
            result_file,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_rejects_empty_fields() {
        assert!(DownloadRequest::new("", "mp3").is_err());
        assert!(DownloadRequest::new("https://x", " ").is_err());
        let r = DownloadRequest::new("https://x", "mp3").unwrap();
        assert_eq!(r.target_format, "mp3");
    }

    #[test]
    fn template_escapes_percent_in_dir() {
        assert_eq!(
            output_template(Path::new("/tmp")),
            "/tmp/%(title)s.%(ext)s"
        );
        assert_eq!(
            output_template(Path::new("/tmp/100%/")),
            "/tmp/100%%/%(title)s.%(ext)s"
        );
    }

    #[test]
    fn only_downloading_ticks_print() {
        let mut ev = ProgressEvent {
            status: ProgressStatus::Downloading,
            percent: "12.5%".to_string(),
            speed: "2.00MiB/s".to_string(),
            eta: "00:04".to_string(),
        };
        assert_eq!(
            progress_line(&ev).as_deref(),
            Some("Downloading: 12.5% at 2.00MiB/s ETA 00:04")
        );
        ev.status = ProgressStatus::Finished;
        assert_eq!(progress_line(&ev), None);
        ev.status = ProgressStatus::Error;
        assert_eq!(progress_line(&ev), None);
    }

    #[test]
    fn settings_from_config() {
        let cfg = TunegrabConfig {
            output_dir: Some(PathBuf::from("/srv/audio")),
            ..TunegrabConfig::default()
        };
        let s = PipelineSettings::from_config(&cfg, Some("http://p:1".to_string()));
        assert_eq!(s.output_dir, PathBuf::from("/srv/audio"));
        assert_eq!(s.stale_age, Duration::from_secs(3600));
        assert_eq!(s.audio_quality, "192");
        assert_eq!(s.proxy.as_deref(), Some("http://p:1"));
    }
}
