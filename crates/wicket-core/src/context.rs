//! Per-request context.

use crate::request_id::RequestId;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Immutable record created once when a request enters the pipeline.
///
/// The context is owned by the request that created it and is passed by
/// value or reference down the middleware chain to the page that renders
/// the response. It is never shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    started_at: DateTime<Local>,
    start: Instant,
}

impl RequestContext {
    /// Creates a context for a request starting now.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Local::now(),
            start: Instant::now(),
        }
    }

    /// Returns the correlation id.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Wall-clock time at which the request entered the pipeline.
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// Time spent on this request so far.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
