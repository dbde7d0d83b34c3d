//! Wiring from configuration to a runnable server.

use crate::cli::Cli;
use anyhow::Context;
use std::sync::Arc;
use wicket_config::{ConfigError, ConfigLoader, ServerSection, WicketConfig};
use wicket_server::{Server, ServerConfig};
use wicket_telemetry::{AccessLogSink, LogConfig};

/// Configuration file read from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "wicket.toml";

/// Prefix for environment overrides, e.g. `WICKET__SERVER__LISTEN_ADDR`.
pub const ENV_PREFIX: &str = "WICKET";

/// Loads defaults, the config file, `.env` and `WICKET__*` variables, then
/// applies command-line flags and validates the result.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, an
/// environment override is malformed, or the final values are invalid.
pub fn load_config(cli: &Cli) -> Result<WicketConfig, ConfigError> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_file(path)?,
        None => ConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE)?,
    };

    let mut config = loader.with_dotenv().with_env_prefix(ENV_PREFIX).load()?;
    cli.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Process-log settings for `config`.
///
/// Runs before any subscriber is installed, so it cannot log. An unknown
/// format is rejected by [`WicketConfig::validate`] inside [`load_config`];
/// an unvalidated config falls back to the default format.
#[must_use]
pub fn log_config(config: &WicketConfig) -> LogConfig {
    let format = config.logging.format.parse().unwrap_or_default();
    LogConfig {
        level: config.logging.level.clone(),
        format,
        ..LogConfig::default()
    }
}

/// Server settings for `section`.
#[must_use]
pub fn server_config(section: &ServerSection) -> ServerConfig {
    ServerConfig::builder()
        .listen_addr(section.listen_addr.clone())
        .read_timeout(section.read_timeout())
        .write_timeout(section.write_timeout())
        .idle_timeout(section.idle_timeout())
        .drain_deadline(section.drain_deadline())
        .build()
}

/// Opens the access log and assembles the server with the demo pages.
///
/// # Errors
///
/// Fails if the access log cannot be opened.
pub fn build_server(config: &WicketConfig) -> anyhow::Result<Server> {
    let sink = AccessLogSink::open(&config.access_log.path, config.access_log.prefix.clone())
        .with_context(|| format!("failed to open access log {}", config.access_log.path))?;

    let server = Server::builder()
        .config(server_config(&config.server))
        .access_log(Arc::new(sink))
        .pages(wicket_pages::default_pages())
        .build()?;
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use wicket_server::LifecycleState;
    use wicket_telemetry::LogFormat;

    #[test]
    fn test_explicit_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wicket.toml");
        std::fs::write(
            &path,
            "[server]\nlisten_addr = \"127.0.0.1:9100\"\ndrain_deadline_secs = 5\n",
        )
        .unwrap();

        let cli = Cli {
            config: Some(path),
            ..Cli::default()
        };
        let config = load_config(&cli).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9100");
        assert_eq!(config.server.drain_deadline_secs, 5);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let cli = Cli {
            config: Some("/definitely/not/here/wicket.toml".into()),
            ..Cli::default()
        };
        assert!(matches!(
            load_config(&cli),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_cli_address_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wicket.json");
        std::fs::write(&path, r#"{"server": {"listen_addr": "127.0.0.1:9100"}}"#).unwrap();

        let cli = Cli {
            address: Some(":7000".to_string()),
            config: Some(path),
            log_file: None,
        };
        let config = load_config(&cli).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:7000");
    }

    #[test]
    fn test_log_config_mapping() {
        let mut config = WicketConfig::default();
        config.logging.level = "debug".to_string();
        config.logging.format = "json".to_string();

        let log = log_config(&config);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_log_format_fails_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wicket.toml");
        std::fs::write(&path, "[logging]\nformat = \"yaml\"\n").unwrap();

        let cli = Cli {
            config: Some(path),
            ..Cli::default()
        };
        match load_config(&cli) {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "logging.format"),
            other => panic!("expected invalid logging.format, got {other:?}"),
        }
    }

    #[test]
    fn test_log_config_accepts_any_case() {
        let mut config = WicketConfig::default();
        config.logging.format = "Compact".to_string();
        config.validate().unwrap();
        assert_eq!(log_config(&config).format, LogFormat::Compact);
    }

    #[test]
    fn test_server_config_mapping() {
        let section = ServerSection {
            listen_addr: "127.0.0.1:0".to_string(),
            read_timeout_secs: 1,
            write_timeout_secs: 2,
            idle_timeout_secs: 3,
            drain_deadline_secs: 4,
        };
        let server = server_config(&section);
        assert_eq!(server.listen_addr(), "127.0.0.1:0");
        assert_eq!(server.read_timeout(), Duration::from_secs(1));
        assert_eq!(server.write_timeout(), Duration::from_secs(2));
        assert_eq!(server.idle_timeout(), Duration::from_secs(3));
        assert_eq!(server.drain_deadline(), Duration::from_secs(4));
    }

    #[test]
    fn test_build_server_opens_access_log() {
        let dir = TempDir::new().unwrap();
        let mut config = WicketConfig::default();
        config.access_log.path = dir.path().join("access.log").display().to_string();

        let server = build_server(&config).unwrap();
        assert_eq!(server.lifecycle().state(), LifecycleState::Starting);
        assert!(dir.path().join("access.log").exists());
    }

    #[test]
    fn test_build_server_fails_on_unwritable_log() {
        let dir = TempDir::new().unwrap();
        let mut config = WicketConfig::default();
        config.access_log.path = dir.path().join("missing").join("access.log").display().to_string();

        let err = build_server(&config).unwrap_err();
        assert!(err.to_string().starts_with("failed to open access log"));
    }
}
