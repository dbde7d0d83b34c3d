//! # Wicket
//!
//! A small HTTP server that:
//!
//! - tags every request with an `X-Request-Id` and echoes it back
//! - writes one access-log line per completed request
//! - reports liveness on `/health` and serves its own access log on `/log`
//! - drains in-flight requests on SIGINT/SIGTERM within a bounded deadline
//!
//! This crate holds the `wicket` binary and re-exports the member crates.
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`wicket_core`] | Request ids, request context, the page contract |
//! | [`wicket_middleware`] | Tracing and access-log pipeline |
//! | [`wicket_server`] | Listener, dispatcher, health, lifecycle |
//! | [`wicket_telemetry`] | Process logging and the access-log sink |
//! | [`wicket_config`] | Layered configuration |
//! | [`wicket_pages`] | Demo pages |

#![doc(html_root_url = "https://docs.rs/wicket/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;

pub use wicket_config;
pub use wicket_core;
pub use wicket_middleware;
pub use wicket_pages;
pub use wicket_server;
pub use wicket_telemetry;

pub use cli::Cli;
pub use wicket_server::{Server, ServerError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
