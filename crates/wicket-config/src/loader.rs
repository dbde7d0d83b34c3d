//! Layered configuration loader.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, WicketConfig};

/// Loads configuration from defaults, a file and environment variables.
///
/// # Example
///
/// ```no_run
/// use wicket_config::ConfigLoader;
///
/// # fn main() -> Result<(), wicket_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("wicket.toml")?
///     .with_env_prefix("WICKET")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: WicketConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a TOML (`.toml`) or JSON (`.json`) file.
    ///
    /// Fields missing from the file keep their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        self.config = Self::parse_file(&content, path)?;

        Ok(self)
    }

    /// Loads the file if it exists, otherwise keeps the current values.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Parses configuration from a string in the given format.
    ///
    /// ```
    /// use wicket_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nlisten_addr = \":9000\"\n", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Enables `PREFIX__SECTION__KEY` environment overrides.
    ///
    /// With prefix `WICKET`:
    /// - `WICKET__SERVER__LISTEN_ADDR=:9000`
    /// - `WICKET__ACCESS_LOG__PATH=/var/log/wicket.log`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads variables from a `.env` file in the working directory, if any.
    pub fn with_dotenv(self) -> Self {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(self) -> Result<WicketConfig, ConfigError> {
        let vars: Vec<(String, String)> = if self.env_prefix.is_some() {
            env::vars().collect()
        } else {
            Vec::new()
        };
        self.load_with_vars(vars)
    }

    /// Returns the configuration without env overrides or validation.
    pub fn load_unvalidated(self) -> WicketConfig {
        self.config
    }

    fn load_with_vars<I>(mut self, vars: I) -> Result<WicketConfig, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            for (key, value) in vars {
                if let Some(rest) = key.strip_prefix(&marker) {
                    self.apply_env_var(&key, rest, &value)?;
                }
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<WicketConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_var(&mut self, key: &str, rest: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = rest.split("__").collect();
        let server = &mut self.config.server;

        match parts.as_slice() {
            ["SERVER", "LISTEN_ADDR"] => server.listen_addr = value.to_string(),
            ["SERVER", "READ_TIMEOUT_SECS"] => server.read_timeout_secs = parse_secs(key, value)?,
            ["SERVER", "WRITE_TIMEOUT_SECS"] => server.write_timeout_secs = parse_secs(key, value)?,
            ["SERVER", "IDLE_TIMEOUT_SECS"] => server.idle_timeout_secs = parse_secs(key, value)?,
            ["SERVER", "DRAIN_DEADLINE_SECS"] => {
                server.drain_deadline_secs = parse_secs(key, value)?;
            }
            ["ACCESS_LOG", "PATH"] => self.config.access_log.path = value.to_string(),
            ["ACCESS_LOG", "PREFIX"] => self.config.access_log.prefix = value.to_string(),
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => self.config.logging.format = value.to_lowercase(),
            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected a whole number of seconds"))
}
