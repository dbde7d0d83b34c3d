//! Process-wide health flag.
//!
//! The flag starts unhealthy, flips to healthy once the listener is bound and
//! flips back to unhealthy when shutdown begins. The last transition is
//! permanent: a retired server never reports healthy again.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const STARTING: u8 = 0;
const HEALTHY: u8 = 1;
const RETIRED: u8 = 2;

/// Shared, lock-free health flag.
///
/// Cloning is cheap and every clone observes the same flag.
///
/// # Example
///
/// ```
/// use wicket_server::HealthState;
///
/// let health = HealthState::new();
/// assert!(!health.is_healthy());
///
/// health.mark_healthy();
/// assert!(health.is_healthy());
///
/// health.mark_unhealthy();
/// health.mark_healthy();
/// assert!(!health.is_healthy());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HealthState {
    state: Arc<AtomicU8>,
}

impl HealthState {
    /// Creates an unhealthy flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the server healthy. Has no effect once the server is retired.
    pub fn mark_healthy(&self) {
        let _ = self
            .state
            .compare_exchange(STARTING, HEALTHY, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Marks the server unhealthy for the rest of its life.
    pub fn mark_unhealthy(&self) {
        self.state.store(RETIRED, Ordering::Release);
    }

    /// Returns `true` while the server is accepting and serving requests.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.state.load(Ordering::Acquire) == HEALTHY
    }
}
