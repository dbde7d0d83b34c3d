//! Request correlation ids.
//!
//! A request either carries an `X-Request-Id` header, in which case the value
//! is propagated unchanged, or receives a fresh id derived from the wall clock.
//!
//! # Uniqueness
//!
//! Generated ids are the decimal number of nanoseconds since the Unix epoch.
//! No lock or shared counter is involved, so two requests observing the same
//! clock reading receive the same id. Collisions are therefore bounded by clock
//! resolution, and a backwards clock adjustment can repeat earlier ids. Ids are
//! meant for correlating log lines, not as keys that must never collide.

use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Header carrying the correlation id, inbound and outbound.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Placeholder logged when a request reaches the access log without a context.
pub const UNKNOWN_REQUEST_ID: &str = "UNKNOWN";

/// An opaque correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an existing id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The `UNKNOWN` placeholder id.
    pub fn unknown() -> Self {
        Self(UNKNOWN_REQUEST_ID.to_owned())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of fresh request ids.
///
/// Implementations are called concurrently from every in-flight request and
/// must not coordinate across requests.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produces a new id.
    fn generate(&self) -> RequestId;
}

/// Generates ids from the current wall-clock time in nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockIdGenerator;

impl IdGenerator for ClockIdGenerator {
    fn generate(&self) -> RequestId {
        let now = Utc::now();
        let nanos = i128::from(now.timestamp()) * 1_000_000_000
            + i128::from(now.timestamp_subsec_nanos());
        RequestId(nanos.to_string())
    }
}

/// Resolves the correlation id for a request.
///
/// # Example
///
/// ```
/// use wicket_core::RequestIdentity;
///
/// let identity = RequestIdentity::new();
/// assert_eq!(identity.resolve(Some("abc-123")).as_str(), "abc-123");
/// assert!(!identity.resolve(None).as_str().is_empty());
/// ```
#[derive(Clone)]
pub struct RequestIdentity {
    generator: Arc<dyn IdGenerator>,
}

impl RequestIdentity {
    /// Creates a resolver backed by [`ClockIdGenerator`].
    pub fn new() -> Self {
        Self::with_generator(ClockIdGenerator)
    }

    /// Creates a resolver backed by a custom generator.
    pub fn with_generator(generator: impl IdGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Returns the inbound id unchanged when present, otherwise a fresh one.
    ///
    /// An empty inbound value counts as absent.
    pub fn resolve(&self, inbound: Option<&str>) -> RequestId {
        match inbound {
            Some(value) if !value.is_empty() => RequestId(value.to_owned()),
            _ => self.generator.generate(),
        }
    }

    /// Like [`resolve`](Self::resolve), for a raw header value.
    ///
    /// Header values may carry bytes outside visible ASCII. Those are decoded
    /// as UTF-8, with invalid sequences replaced by U+FFFD.
    pub fn resolve_bytes(&self, inbound: Option<&[u8]>) -> RequestId {
        match inbound {
            Some(value) if !value.is_empty() => {
                RequestId(String::from_utf8_lossy(value).into_owned())
            }
            _ => self.generator.generate(),
        }
    }
}

impl Default for RequestIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIdentity").finish_non_exhaustive()
    }
}
