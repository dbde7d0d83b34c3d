//! Configuration types.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WicketConfig {
    /// Listener and timeout settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Access log file settings.
    #[serde(default)]
    pub access_log: AccessLogSection,

    /// Process log settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerSection {
    /// Address to listen on. `:8888` means all interfaces, port 8888.
    pub listen_addr: String,

    /// Limit for reading a request's headers and body.
    pub read_timeout_secs: u64,

    /// Limit for producing a response.
    pub write_timeout_secs: u64,

    /// How long an idle keep-alive connection is kept open.
    pub idle_timeout_secs: u64,

    /// How long shutdown waits for in-flight requests.
    pub drain_deadline_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8888".to_string(),
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            idle_timeout_secs: 30,
            drain_deadline_secs: 30,
        }
    }
}

impl ServerSection {
    /// Read timeout as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Write timeout as a duration.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Idle timeout as a duration.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Drain deadline as a duration.
    pub fn drain_deadline(&self) -> Duration {
        Duration::from_secs(self.drain_deadline_secs)
    }
}

/// `[access_log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AccessLogSection {
    /// File the access log is appended to.
    pub path: String,

    /// Text written after the timestamp on each line.
    pub prefix: String,
}

impl Default for AccessLogSection {
    fn default() -> Self {
        Self {
            path: "server_log.log".to_string(),
            prefix: "http:".to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingSection {
    /// Filter directive such as `info` or `wicket_server=debug`.
    pub level: String,

    /// `json`, `pretty` or `compact`.
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl WicketConfig {
    /// Checks the configuration for values the server cannot run with.
    ///
    /// Also rewrites a `:port` listen address to `0.0.0.0:port`.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.listen_addr = normalize_listen_addr(&self.server.listen_addr);

        let port_ok = self
            .server
            .listen_addr
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !port_ok {
            return Err(ConfigError::invalid_value(
                "server.listen_addr",
                format!("expected host:port, got '{}'", self.server.listen_addr),
            ));
        }

        for (field, value) in [
            ("server.read_timeout_secs", self.server.read_timeout_secs),
            ("server.write_timeout_secs", self.server.write_timeout_secs),
            ("server.idle_timeout_secs", self.server.idle_timeout_secs),
            ("server.drain_deadline_secs", self.server.drain_deadline_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid_value(field, "must be greater than zero"));
            }
        }

        if self.access_log.path.trim().is_empty() {
            return Err(ConfigError::invalid_value("access_log.path", "must not be empty"));
        }

        if !matches!(
            self.logging.format.to_ascii_lowercase().as_str(),
            "json" | "pretty" | "compact"
        ) {
            return Err(ConfigError::invalid_value(
                "logging.format",
                "expected 'json', 'pretty' or 'compact'",
            ));
        }

        Ok(())
    }
}

/// Expands the `:port` shorthand to `0.0.0.0:port`.
///
/// ```
/// use wicket_config::normalize_listen_addr;
///
/// assert_eq!(normalize_listen_addr(":8888"), "0.0.0.0:8888");
/// assert_eq!(normalize_listen_addr("127.0.0.1:80"), "127.0.0.1:80");
/// ```
pub fn normalize_listen_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}
