//! # Wicket Server
//!
//! HTTP/1.1 server for Wicket.
//!
//! - Binds one listener and serves each connection on its own task
//! - Runs every request through the [`Pipeline`](wicket_middleware::Pipeline)
//!   and the [`Dispatcher`]
//! - Exposes `/health` and `/log`
//! - Drains gracefully on SIGINT/SIGTERM within a bounded deadline
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wicket_server::{Server, ServerConfig};
//! use wicket_telemetry::AccessLogSink;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sink = Arc::new(AccessLogSink::open("server_log.log", "http:")?);
//!     Server::builder()
//!         .config(ServerConfig::default())
//!         .access_log(sink)
//!         .build()?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/wicket-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod connection;
pub mod dispatcher;
mod error;
mod health;
pub mod lifecycle;
mod server;
pub mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_DRAIN_DEADLINE_SECS, DEFAULT_IDLE_TIMEOUT_SECS,
    DEFAULT_LISTEN_ADDR, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_WRITE_TIMEOUT_SECS,
};
pub use dispatcher::{Dispatcher, DispatcherBuilder, HEALTH_PATH, LOG_PATH};
pub use error::{LifecycleError, ServerError, ServerResult, ShutdownError, StartupError};
pub use health::HealthState;
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use server::{BoundServer, Server, ServerBuilder};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownReceiver, ShutdownSignal};
