//! Logging for Wicket.
//!
//! Two distinct streams are produced by a running server:
//!
//! - **Process diagnostics**: structured `tracing` events (startup, shutdown,
//!   sink failures), formatted by `tracing-subscriber` as JSON or pretty text.
//!   See [`logging`].
//! - **Access log**: exactly one plain-text line per completed request,
//!   appended to a file opened at startup. See [`access_log`].
//!
//! # Example
//!
//! ```rust,ignore
//! use wicket_telemetry::{init_logging, AccessLogSink, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! let sink = AccessLogSink::open("server_log.log", "http:")?;
//! ```

#![doc(html_root_url = "https://docs.rs/wicket-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod access_log;
pub mod error;
pub mod logging;

pub use access_log::{AccessLogRecord, AccessLogSink, DEFAULT_LOG_FILE, DEFAULT_LOG_PREFIX};
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
