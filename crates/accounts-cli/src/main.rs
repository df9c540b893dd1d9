use accounts_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init_logging() {
        match logging::init_logging_stderr() {
            Ok(()) => tracing::warn!("log file unavailable, logging to stderr: {:#}", e),
            Err(stderr_err) => eprintln!(
                "accounts: logging disabled: {:#}; {:#}",
                e, stderr_err
            ),
        }
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("accounts error: {:#}", err);
        std::process::exit(1);
    }
}
