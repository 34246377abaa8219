//! CLI command handlers. Each command is in its own file.

mod bpm;
mod download;
mod key;

pub use bpm::run_bpm;
pub use download::run_download;
pub use key::run_key;
