//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use forkcast_cli::CliError;

fn main() -> eyre::Result<()> {
    forkcast_cli::init_logging().map_err(eyre::Report::msg)?;
    match forkcast_cli::run() {
        Ok(()) => Ok(()),
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => Err(eyre::Report::new(err)),
    }
}
