use tunegrab_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging as early as possible; stdout/stderr belong to the caller's protocol.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        cli::report::report_failure(&err, &mut std::io::stderr());
        std::process::exit(1);
    }
}
