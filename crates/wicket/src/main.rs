//! Wicket - entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use wicket::{app, Cli};
use wicket_telemetry::{init_logging, LogConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match app::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging(&LogConfig::default());
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&app::log_config(&config)) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    info!(
        version = wicket::VERSION,
        listen_addr = %config.server.listen_addr,
        access_log = %config.access_log.path,
        "starting wicket"
    );

    let server = match app::build_server(&config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %format!("{e:#}"), "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
