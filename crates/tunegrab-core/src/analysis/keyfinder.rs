//! Key via `keyfinder-cli` (libkeyfinder).

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::command::run_tool;
use super::{AnalysisError, KeyAnalyzer};

#[derive(Debug, Clone)]
pub struct KeyFinderCli {
    program: PathBuf,
}

impl KeyFinderCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// keyfinder-cli prints the key as its last line (`Am`, `F#`, ...).
pub(crate) fn parse_key_output(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(String::from)
}

#[async_trait(?Send)]
impl KeyAnalyzer for KeyFinderCli {
    async fn estimate_key(&self, path: &Path) -> Result<String> {
        let stdout = run_tool(&self.program, [path.as_os_str()]).await?;
        parse_key_output(&stdout).ok_or_else(|| {
            AnalysisError::UnparsableOutput {
                program: self.program.display().to_string(),
                output: stdout.clone(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_non_empty_line() {
        assert_eq!(parse_key_output("Am\n").as_deref(), Some("Am"));
        assert_eq!(parse_key_output("loading...\n  F#  \n\n").as_deref(), Some("F#"));
        assert_eq!(parse_key_output("\n \n"), None);
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let err = KeyFinderCli::new("/nonexistent/tunegrab-test/keyfinder-cli")
            .estimate_key(f.path())
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to spawn"));
    }
}
