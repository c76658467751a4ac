//! Herald CLI binary.
//!
//! - `herald run` drives the posting loop until Ctrl-C
//! - `herald check` validates configuration and credentials
//! - `herald config` prints the effective configuration

use clap::Parser;
use herald::{Cli, dispatch, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Credentials may come from a .env file
    dotenvy::dotenv().ok();

    let logging = init_logging(cli.verbose, cli.json_logs())?;

    let result = dispatch(cli.command).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Herald exited with an error");
    }
    logging.shutdown();

    result.map_err(Into::into)
}
