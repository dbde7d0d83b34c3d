//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;
use wicket_config::{normalize_listen_addr, WicketConfig};

/// Command-line arguments for the `wicket` binary.
///
/// Flags override values from the configuration file and the environment.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "wicket", version, about = "Wicket HTTP server")]
pub struct Cli {
    /// Address to listen on, e.g. `:8888` or `127.0.0.1:8080`.
    #[arg(short = 'a', long = "address", value_name = "ADDR")]
    pub address: Option<String>,

    /// Configuration file (TOML or JSON).
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Access log file.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Writes the flags that were given over `config`.
    pub fn apply(&self, config: &mut WicketConfig) {
        if let Some(address) = &self.address {
            config.server.listen_addr = normalize_listen_addr(address);
        }
        if let Some(path) = &self.log_file {
            config.access_log.path = path.display().to_string();
        }
    }
}
