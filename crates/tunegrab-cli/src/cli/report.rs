//! Failure reporting on stderr.
//!
//! Extractor failures are expected and get a single `ERROR:<message>` line.
//! Anything else gets the full error chain (and backtrace, when enabled)
//! before the same `ERROR:` line.

use std::io::Write;
use tunegrab_core::extractor::ExtractError;

pub const ERROR_PREFIX: &str = "ERROR:";

pub fn report_failure(err: &anyhow::Error, w: &mut dyn Write) {
    if let Some(extract) = err.downcast_ref::<ExtractError>() {
        tracing::error!(error = %extract, "extraction failed");
        let _ = writeln!(w, "{ERROR_PREFIX}{extract}");
    } else {
        tracing::error!(error = ?err, "unexpected failure");
        let _ = writeln!(w, "{err:?}");
        let _ = writeln!(w, "{ERROR_PREFIX}{err:#}");
    }
    let _ = w.flush();
}
