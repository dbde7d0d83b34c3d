//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use wicket_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .listen_addr("127.0.0.1:8888")
//!     .drain_deadline(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.listen_addr(), "127.0.0.1:8888");
//! assert_eq!(config.drain_deadline(), Duration::from_secs(5));
//! ```

use std::time::Duration;

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8888";

/// Default time allowed to read a request's headers and body.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

/// Default time a handler may take to produce its response.
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

/// Default time a keep-alive connection may sit idle before it is closed.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Default time allowed for in-flight requests to finish during shutdown.
pub const DEFAULT_DRAIN_DEADLINE_SECS: u64 = 30;

/// Server configuration.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    listen_addr: String,
    read_timeout: Duration,
    write_timeout: Duration,
    idle_timeout: Duration,
    drain_deadline: Duration,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the `host:port` the server binds to.
    #[must_use]
    pub fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    /// Returns the request read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Returns the handler (response write) timeout.
    #[must_use]
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Returns the keep-alive idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the graceful drain deadline.
    #[must_use]
    pub fn drain_deadline(&self) -> Duration {
        self.drain_deadline
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    listen_addr: String,
    read_timeout: Duration,
    write_timeout: Duration,
    idle_timeout: Duration,
    drain_deadline: Duration,
}

impl ServerConfigBuilder {
    /// Creates a builder populated with the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            drain_deadline: Duration::from_secs(DEFAULT_DRAIN_DEADLINE_SECS),
        }
    }

    /// Sets the listen address. Use port `0` to let the OS pick one.
    #[must_use]
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    /// Sets the request read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the handler timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Sets the keep-alive idle timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the graceful drain deadline.
    #[must_use]
    pub fn drain_deadline(mut self, deadline: Duration) -> Self {
        self.drain_deadline = deadline;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.listen_addr,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
            idle_timeout: self.idle_timeout,
            drain_deadline: self.drain_deadline,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
