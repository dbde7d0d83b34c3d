//! Server lifecycle state machine.
//!
//! ```text
//! Starting ──bind ok──▶ Serving ──signal──▶ Draining ──all closed──▶ Stopped
//!     │                                         │
//!     └──bind failed──▶ Failed ◀──deadline──────┘
//! ```
//!
//! Every transition is one-way. The health flag follows the state: it turns
//! healthy on entering `Serving` and unhealthy before `Draining` is entered.

use crate::error::{LifecycleError, ShutdownError};
use crate::health::HealthState;
use crate::shutdown::ConnectionTracker;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Where the server is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LifecycleState {
    /// Configuration loaded, listener not yet bound.
    Starting = 0,
    /// Accepting connections.
    Serving = 1,
    /// No longer accepting; waiting for open connections to finish.
    Draining = 2,
    /// Drained cleanly.
    Stopped = 3,
    /// Failed to start or to drain in time.
    Failed = 4,
}

impl LifecycleState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Starting,
            1 => Self::Serving,
            2 => Self::Draining,
            3 => Self::Stopped,
            _ => Self::Failed,
        }
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Serving => "serving",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for `Stopped` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drives the lifecycle state and the health flag together.
///
/// Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    state: Arc<AtomicU8>,
    health: HealthState,
    drain_deadline: Duration,
}

impl LifecycleManager {
    /// Creates a manager in the `Starting` state.
    #[must_use]
    pub fn new(health: HealthState, drain_deadline: Duration) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(LifecycleState::Starting as u8)),
            health,
            drain_deadline,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The health flag this manager drives.
    #[must_use]
    pub fn health(&self) -> &HealthState {
        &self.health
    }

    /// How long [`drain`](Self::drain) waits.
    #[must_use]
    pub fn drain_deadline(&self) -> Duration {
        self.drain_deadline
    }

    /// `Starting → Serving`, then marks the server healthy.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the server is not `Starting`.
    pub fn mark_serving(&self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Starting, LifecycleState::Serving)?;
        self.health.mark_healthy();
        Ok(())
    }

    /// `Starting → Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] if the server is not `Starting`.
    pub fn mark_start_failed(&self) -> Result<(), LifecycleError> {
        self.health.mark_unhealthy();
        self.transition(LifecycleState::Starting, LifecycleState::Failed)
    }

    /// Marks the server unhealthy, then `Serving → Draining`.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn begin_drain(&self) -> bool {
        self.health.mark_unhealthy();
        self.transition(LifecycleState::Serving, LifecycleState::Draining)
            .is_ok()
    }

    /// Waits for every tracked connection to close, bounded by the drain
    /// deadline, and moves to `Stopped` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError::DrainTimeout`] if connections are still open
    /// at the deadline, or [`ShutdownError::Lifecycle`] if the server is not
    /// `Draining`.
    pub async fn drain(&self, tracker: &ConnectionTracker) -> Result<(), ShutdownError> {
        let current = self.state();
        if current != LifecycleState::Draining {
            return Err(LifecycleError {
                from: current,
                to: LifecycleState::Stopped,
            }
            .into());
        }

        match tokio::time::timeout(self.drain_deadline, tracker.wait_until_idle()).await {
            Ok(()) => {
                self.transition(LifecycleState::Draining, LifecycleState::Stopped)?;
                Ok(())
            }
            Err(_) => {
                self.transition(LifecycleState::Draining, LifecycleState::Failed)?;
                Err(ShutdownError::DrainTimeout {
                    deadline: self.drain_deadline,
                    active: tracker.active_connections(),
                })
            }
        }
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), LifecycleError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|actual| LifecycleError {
                from: LifecycleState::from_u8(actual),
                to,
            })
    }
}
