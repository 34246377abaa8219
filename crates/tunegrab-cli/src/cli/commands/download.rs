//! `tunegrab download <url> <format>` – fetch, transcode and hand off via a result file.

use anyhow::Result;
use tunegrab_core::config::{TunegrabConfig, PROXY_ENV_VAR};
use tunegrab_core::extractor::YtDlp;
use tunegrab_core::pipeline::{DownloadRequest, Pipeline, PipelineSettings};

pub async fn run_download(cfg: &TunegrabConfig, url: &str, format: &str) -> Result<()> {
    // The only place the environment is consulted.
    let proxy = cfg.resolve_proxy(std::env::var(PROXY_ENV_VAR).ok());
    let settings = PipelineSettings::from_config(cfg, proxy);
    let pipeline = Pipeline::new(YtDlp::from_config(&cfg.extractor), settings);

    let request = DownloadRequest::new(url, format)?;
    let outcome = pipeline
        .run(&request, &mut std::io::stdout(), &mut std::io::stderr())
        .await?;
    tracing::info!(
        result_file = %outcome.result_file.display(),
        file = %outcome.result.file_path.display(),
        "download complete"
    );
    Ok(())
}
