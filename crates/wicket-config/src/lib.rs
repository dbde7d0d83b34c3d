//! Typed configuration for Wicket.
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML or JSON file
//! 3. `WICKET__SECTION__KEY` environment variables (optionally from `.env`)
//!
//! Command-line flags are applied on top by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! listen_addr = ":8888"
//! read_timeout_secs = 10
//! write_timeout_secs = 10
//! idle_timeout_secs = 30
//! drain_deadline_secs = 30
//!
//! [access_log]
//! path = "server_log.log"
//! prefix = "http:"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use wicket_config::ConfigLoader;
//!
//! # fn main() -> Result<(), wicket_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("wicket.toml")?
//!     .with_env_prefix("WICKET")
//!     .load()?;
//!
//! println!("listening on {}", config.server.listen_addr);
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/wicket-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{
    normalize_listen_addr, AccessLogSection, LoggingSection, ServerSection, WicketConfig,
};
pub use error::ConfigError;
pub use loader::ConfigLoader;
