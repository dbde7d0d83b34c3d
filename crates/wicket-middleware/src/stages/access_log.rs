//! Access-log stage.
//!
//! Captures the request line before running the inner stages and appends one
//! [`AccessLogRecord`] after they return. Because the dispatcher turns every
//! handler failure into a response, every request that completes produces
//! exactly one line. A request whose task dies mid-flight produces none.
//!
//! A failure to write the line is reported through `tracing` and does not
//! change the response.

use crate::context::MiddlewareContext;
use crate::middleware::{Middleware, Next};
use chrono::Local;
use http::header::USER_AGENT;
use std::sync::Arc;
use wicket_core::{BoxFuture, Request, RequestId, Response};
use wicket_telemetry::{AccessLogRecord, AccessLogSink};

/// Stage that writes the access log.
#[derive(Debug, Clone)]
pub struct AccessLogStage {
    sink: Arc<AccessLogSink>,
}

impl AccessLogStage {
    /// Creates the stage writing to `sink`.
    pub fn new(sink: Arc<AccessLogSink>) -> Self {
        Self { sink }
    }
}

impl Middleware for AccessLogStage {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().to_string();
            let path = request.uri().path().to_owned();
            let user_agent = request
                .headers()
                .get(USER_AGENT)
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
            let remote_addr = ctx
                .remote_addr()
                .map_or_else(|| "-".to_string(), |addr| addr.to_string());

            let response = next.run(ctx, request).await;

            let request_id = ctx
                .request_context()
                .map_or_else(RequestId::unknown, |rc| rc.request_id().clone());

            ::tracing::debug!(
                request_id = %request_id,
                status = response.status().as_u16(),
                elapsed_ms = ctx
                    .request_context()
                    .map_or(0.0, |rc| rc.elapsed().as_secs_f64() * 1000.0),
                "request completed"
            );

            let record = AccessLogRecord {
                request_id,
                method,
                path,
                remote_addr,
                user_agent,
                timestamp: Local::now(),
            };
            if let Err(e) = self.sink.append(&record) {
                ::tracing::error!(
                    request_id = %record.request_id,
                    error = %e,
                    "failed to write access log line"
                );
            }

            response
        })
    }
}
