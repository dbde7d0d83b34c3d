//! Telemetry error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up or writing logs.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize the `tracing` subscriber.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Unknown log format name.
    #[error("Invalid log format '{0}' (expected json, pretty or compact)")]
    InvalidFormat(String),

    /// The access log file could not be opened.
    #[error("Failed to open access log {}: {source}", path.display())]
    AccessLogOpen {
        /// File that was being opened.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Appending a line to the access log failed.
    #[error("Failed to write access log: {0}")]
    AccessLogWrite(#[source] std::io::Error),

    /// Reading the access log back failed.
    #[error("Failed to read access log: {0}")]
    AccessLogRead(#[source] std::io::Error),
}
