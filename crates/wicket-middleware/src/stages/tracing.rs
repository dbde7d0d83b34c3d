//! Request tracing stage.
//!
//! Resolves the correlation id for each request and makes it visible three
//! ways: in the [`RequestContext`] handed down the chain, in a `tracing` span
//! wrapping the rest of the pipeline, and in the `X-Request-Id` response
//! header.
//!
//! ## Header Behavior
//!
//! - Inbound `X-Request-Id` present and non-empty: echoed byte for byte
//! - Absent or empty: a fresh id is generated
//!
//! The id placed in the context and the logs is the inbound value decoded as
//! UTF-8, lossily when it is not valid UTF-8.
//!
//! The outbound header value is fixed before the inner stages run and is set
//! on whatever response comes back, including error responses.

use crate::context::MiddlewareContext;
use crate::middleware::{Middleware, Next};
use ::tracing::Instrument;
use http::HeaderValue;
use wicket_core::{
    BoxFuture, Request, RequestContext, RequestIdentity, Response, REQUEST_ID_HEADER,
    UNKNOWN_REQUEST_ID,
};

/// Stage that resolves and propagates the request id.
#[derive(Debug, Clone, Default)]
pub struct TracingStage {
    identity: RequestIdentity,
}

impl TracingStage {
    /// Creates the stage.
    pub fn new(identity: RequestIdentity) -> Self {
        Self { identity }
    }
}

impl Middleware for TracingStage {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let inbound = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .filter(|value| !value.is_empty())
                .cloned();
            let request_id = self
                .identity
                .resolve_bytes(inbound.as_ref().map(HeaderValue::as_bytes));

            // The inbound bytes go back out untouched, even when not UTF-8.
            let header_value = match inbound {
                Some(value) => value,
                None => HeaderValue::from_str(request_id.as_str())
                    .unwrap_or_else(|_| HeaderValue::from_static(UNKNOWN_REQUEST_ID)),
            };

            let span = ::tracing::info_span!(
                "request",
                request_id = %request_id,
                method = %request.method(),
                path = %request.uri().path(),
            );

            ctx.set_request_context(RequestContext::new(request_id));

            let mut response = next.run(ctx, request).instrument(span).await;
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER, header_value);
            response
        })
    }
}
