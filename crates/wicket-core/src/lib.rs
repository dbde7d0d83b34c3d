//! # Wicket Core
//!
//! Core types and traits shared by every Wicket crate.
//!
//! - [`RequestId`] - Correlation id carried in the `X-Request-Id` header
//! - [`RequestIdentity`] - Resolves an inbound id or generates a fresh one
//! - [`RequestContext`] - Immutable per-request record created at pipeline entry
//! - [`PageHandler`] - Contract for the pages served behind the dispatcher
//! - [`PageError`] - Per-request failure reported by a page

#![doc(html_root_url = "https://docs.rs/wicket-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod request_id;
pub mod types;

pub use context::RequestContext;
pub use error::{PageError, PageResult};
pub use handler::{page_fn, FnPage, PageHandler};
pub use request_id::{
    ClockIdGenerator, IdGenerator, RequestId, RequestIdentity, REQUEST_ID_HEADER,
    UNKNOWN_REQUEST_ID,
};
pub use types::{BoxFuture, Request, Response, ResponseExt};
