//! # Wicket Middleware
//!
//! The request pipeline wrapped around the dispatcher.
//!
//! ```text
//! Request → Tracing → AccessLog → Dispatcher
//!                                     ↓
//! Response ← Tracing ← AccessLog ←────┘
//! ```
//!
//! | Stage     | Middleware         | Purpose                                          |
//! |-----------|--------------------|--------------------------------------------------|
//! | 1         | [`TracingStage`]   | Resolve `X-Request-Id`, create the request context, echo the id |
//! | 2         | [`AccessLogStage`] | Append one access-log line once the inner stages return |
//!
//! ## Example
//!
//! ```
//! use wicket_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages[0].name(), "tracing");
//! assert_eq!(stages[1].name(), "access_log");
//! ```

#![doc(html_root_url = "https://docs.rs/wicket-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;

// Re-export main types at crate root
pub use context::MiddlewareContext;
pub use middleware::{Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::{AccessLogStage, TracingStage};
pub use wicket_core::{BoxFuture, Request, Response};
