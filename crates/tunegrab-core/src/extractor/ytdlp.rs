//! yt-dlp backend: runs the program as a child process and streams its stdout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use super::protocol::{self, ExtractorLine};
use super::{ExtractError, ExtractRequest, ExtractedMedia, Extractor, ProgressFn};
use crate::config::ExtractorConfig;

/// Extractor backed by the `yt-dlp` command-line program.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(cfg: &ExtractorConfig) -> Self {
        Self {
            program: PathBuf::from(&cfg.program),
            extra_args: cfg.extra_args.clone(),
        }
    }

    /// Full argument list for one request (URL last).
    ///
    /// `--print` implies `--quiet --simulate`; `--no-simulate` and `--progress`
    /// undo the parts we still need.
    pub fn build_args(&self, request: &ExtractRequest) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--format".into(),
            "bestaudio".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            request.audio_format.clone(),
            "--audio-quality".into(),
            request.audio_quality.clone(),
            "--output".into(),
            request.output_template.clone(),
            "--no-playlist".into(),
            "--newline".into(),
            "--no-colors".into(),
            "--progress".into(),
            "--progress-template".into(),
            format!("download:{}", protocol::progress_template()),
            "--no-simulate".into(),
            "--print".into(),
            format!("after_move:{}", protocol::title_template()),
            "--print".into(),
            format!("after_move:{}", protocol::filepath_template()),
        ];
        if let Some(proxy) = &request.proxy {
            args.push("--proxy".into());
            args.push(proxy.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args.push("--".into());
        args.push(request.url.clone());
        args
    }
}

/// Picks the message of the last `ERROR:` line yt-dlp wrote to stderr,
/// falling back to the last non-empty line.
pub(crate) fn error_message_from_stderr(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(|m| m.trim().to_string())
        .or_else(|| lines.last().map(|l| l.to_string()))
}

#[derive(Default)]
struct StdoutState {
    title: Option<String>,
    output_path: Option<PathBuf>,
}

#[async_trait(?Send)]
impl Extractor for YtDlp {
    async fn extract(
        &self,
        request: &ExtractRequest,
        on_progress: &mut ProgressFn<'_>,
    ) -> Result<ExtractedMedia> {
        tracing::info!(
            program = %self.program.display(),
            url = %request.url,
            format = %request.audio_format,
            "starting extractor"
        );

        let mut child = Command::new(&self.program)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;

        let stdout = child.stdout.take().context("extractor stdout not captured")?;
        let stderr = child.stderr.take().context("extractor stderr not captured")?;

        let read_stdout = async {
            let mut state = StdoutState::default();
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match protocol::parse_line(&line) {
                    ExtractorLine::Progress(ev) => on_progress(&ev),
                    ExtractorLine::Title(t) => state.title = Some(t),
                    ExtractorLine::FilePath(p) => state.output_path = Some(p),
                    ExtractorLine::Other(l) => {
                        if !l.trim().is_empty() {
                            tracing::debug!(line = %l, "extractor output");
                        }
                    }
                }
            }
            Ok::<_, std::io::Error>(state)
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            BufReader::new(stderr).read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let (state, stderr_text) = tokio::join!(read_stdout, read_stderr);
        let status = child.wait().await.context("wait for extractor")?;
        let state = state.context("read extractor stdout")?;
        let stderr_text = stderr_text.context("read extractor stderr")?;

        if !status.success() {
            let message = error_message_from_stderr(&stderr_text)
                .unwrap_or_else(|| format!("{} exited with {}", self.program.display(), status));
            tracing::warn!(%status, %message, "extractor failed");
            return Err(ExtractError::new(message).into());
        }
        if !stderr_text.trim().is_empty() {
            tracing::debug!(stderr = %stderr_text.trim(), "extractor stderr");
        }

        let output_path = state
            .output_path
            .context("extractor finished without reporting an output file")?;
        let title = match state.title {
            Some(t) => t,
            None => {
                tracing::warn!("extractor reported no title, using file stem");
                output_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        };

        tracing::info!(title = %title, path = %output_path.display(), "extractor finished");
        Ok(ExtractedMedia { title, output_path })
    }
}
