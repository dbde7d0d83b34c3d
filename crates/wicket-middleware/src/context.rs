//! Middleware context types.
//!
//! The [`MiddlewareContext`] is the explicit, typed carrier for per-request
//! state as it moves through the pipeline. The tracing stage stores the
//! [`RequestContext`] here; later stages and the dispatcher read it back.

use std::net::SocketAddr;
use wicket_core::RequestContext;

/// Per-request state shared by the stages of one pipeline run.
///
/// # Example
///
/// ```
/// use wicket_core::{RequestContext, RequestId};
/// use wicket_middleware::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(ctx.request_context().is_none());
///
/// ctx.set_request_context(RequestContext::new(RequestId::new("abc")));
/// assert_eq!(ctx.request_context().unwrap().request_id().as_str(), "abc");
/// ```
#[derive(Debug, Default)]
pub struct MiddlewareContext {
    /// Set once by the tracing stage.
    request_context: Option<RequestContext>,

    /// Address of the connected client.
    remote_addr: Option<SocketAddr>,
}

impl MiddlewareContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for a request received from `remote_addr`.
    pub fn with_remote_addr(remote_addr: SocketAddr) -> Self {
        Self {
            request_context: None,
            remote_addr: Some(remote_addr),
        }
    }

    /// Returns the request context, if the tracing stage has run.
    pub fn request_context(&self) -> Option<&RequestContext> {
        self.request_context.as_ref()
    }

    /// Stores the request context.
    pub fn set_request_context(&mut self, request_context: RequestContext) {
        self.request_context = Some(request_context);
    }

    /// Returns the client address.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }
}
