//! In-process extractor double: writes files where yt-dlp would and reports
//! a configurable title/path, or fails like yt-dlp does.

use async_trait::async_trait;
use std::cell::RefCell;
use std::path::PathBuf;
use tunegrab_core::extractor::{
    ExtractError, ExtractRequest, ExtractedMedia, Extractor, ProgressEvent, ProgressFn,
    ProgressStatus,
};

pub enum Outcome {
    /// Create `files` (names relative to the output dir) and report `reported` as the output.
    Produce {
        title: String,
        files: Vec<String>,
        reported: String,
    },
    Fail(String),
}

pub struct FakeExtractor {
    outcome: Outcome,
    pub seen: RefCell<Vec<ExtractRequest>>,
}

impl FakeExtractor {
    pub fn producing(title: &str, files: &[&str], reported: &str) -> Self {
        Self {
            outcome: Outcome::Produce {
                title: title.to_string(),
                files: files.iter().map(|s| s.to_string()).collect(),
                reported: reported.to_string(),
            },
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Outcome::Fail(message.to_string()),
            seen: RefCell::new(Vec::new()),
        }
    }
}

fn tick(status: ProgressStatus, percent: &str) -> ProgressEvent {
    ProgressEvent {
        status,
        percent: percent.to_string(),
        speed: "1.00MiB/s".to_string(),
        eta: "00:01".to_string(),
    }
}

#[async_trait(?Send)]
impl Extractor for FakeExtractor {
    async fn extract(
        &self,
        request: &ExtractRequest,
        on_progress: &mut ProgressFn<'_>,
    ) -> anyhow::Result<ExtractedMedia> {
        self.seen.borrow_mut().push(request.clone());
        match &self.outcome {
            Outcome::Fail(message) => Err(ExtractError::new(message.clone()).into()),
            Outcome::Produce {
                title,
                files,
                reported,
            } => {
                let dir = PathBuf::from(
                    request
                        .output_template
                        .strip_suffix("/%(title)s.%(ext)s")
                        .expect("output template shape"),
                );
                on_progress(&tick(ProgressStatus::Downloading, "50.0%"));
                on_progress(&tick(ProgressStatus::Downloading, "100.0%"));
                on_progress(&tick(ProgressStatus::Finished, "100.0%"));
                for f in files {
                    std::fs::write(dir.join(f), b"audio")?;
                }
                Ok(ExtractedMedia {
                    title: title.clone(),
                    output_path: dir.join(reported),
                })
            }
        }
    }
}
