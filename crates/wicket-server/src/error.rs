//! Server error types.

use crate::lifecycle::LifecycleState;
use std::time::Duration;
use thiserror::Error;
use wicket_telemetry::TelemetryError;

/// Failure before the server starts serving.
#[derive(Error, Debug)]
pub enum StartupError {
    /// The listen address could not be bound.
    #[error("could not listen on {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No access-log sink was supplied to the builder.
    #[error("no access log sink configured")]
    MissingAccessLog,

    /// The access-log sink could not be opened.
    #[error(transparent)]
    AccessLog(#[from] TelemetryError),

    /// The server was asked to start from a state other than `Starting`.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Failure while draining in-flight requests.
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// Connections were still open when the drain deadline passed.
    #[error("drain deadline of {deadline:?} exceeded with {active} connection(s) still open")]
    DrainTimeout {
        /// Configured drain deadline.
        deadline: Duration,
        /// Connections open when the deadline passed.
        active: usize,
    },

    /// Shutdown was requested from a state other than `Draining`.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// An illegal lifecycle transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot move from {from} to {to}")]
pub struct LifecycleError {
    /// State the server was in.
    pub from: LifecycleState,
    /// State that was requested.
    pub to: LifecycleState,
}

/// Any error returned by [`Server::run`](crate::Server::run).
#[derive(Error, Debug)]
pub enum ServerError {
    /// See [`StartupError`].
    #[error("startup failed: {0}")]
    Startup(#[from] StartupError),

    /// See [`ShutdownError`].
    #[error("shutdown failed: {0}")]
    Shutdown(#[from] ShutdownError),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_timeout_message() {
        let err = ShutdownError::DrainTimeout {
            deadline: Duration::from_secs(30),
            active: 3,
        };
        assert_eq!(
            err.to_string(),
            "drain deadline of 30s exceeded with 3 connection(s) still open"
        );
    }

    #[test]
    fn test_server_error_wraps_startup() {
        let err: ServerError = StartupError::MissingAccessLog.into();
        assert!(matches!(err, ServerError::Startup(_)));
        assert_eq!(err.to_string(), "startup failed: no access log sink configured");
    }

    #[test]
    fn test_lifecycle_error_message() {
        let err = LifecycleError {
            from: LifecycleState::Stopped,
            to: LifecycleState::Serving,
        };
        assert_eq!(err.to_string(), "cannot move from stopped to serving");
    }
}
