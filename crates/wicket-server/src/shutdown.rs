//! Graceful shutdown signal handling.
//!
//! [`ShutdownSignal`] is a one-shot, cloneable trigger. The server holds two of
//! them: one wired to SIGINT/SIGTERM that stops the accept loop, and one
//! internal signal that tells every open connection to finish its current
//! request and close.
//!
//! [`ConnectionTracker`] counts open connections so the drain step knows when
//! the last one has gone.
//!
//! # Example
//!
//! ```rust,ignore
//! use wicket_server::ShutdownSignal;
//! use std::time::Duration;
//!
//! let shutdown = ShutdownSignal::new();
//! tokio::select! {
//!     () = shutdown.recv() => println!("shutdown requested"),
//!     () = tokio::time::sleep(Duration::from_secs(60)) => println!("timeout"),
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, Notify};

/// A signal that can be used to trigger and await graceful shutdown.
///
/// All clones observe the same trigger.
///
/// # Example
///
/// ```rust
/// use wicket_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates a new, untriggered shutdown signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the signal. Repeated calls are no-ops.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` if the signal has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that completes once the signal is triggered.
    ///
    /// Completes immediately if it already has been.
    pub fn recv(&self) -> ShutdownReceiver {
        // Subscribe before returning so a trigger after this call is never missed.
        let mut receiver = self.sender.subscribe();
        let wait = async move {
            if receiver.recv().await.is_err() {
                // Every sender is gone without a trigger.
                std::future::pending::<()>().await;
            }
        };

        ShutdownReceiver {
            triggered: Arc::clone(&self.triggered),
            wait: Box::pin(wait),
        }
    }

    /// Creates a signal that triggers on SIGTERM or SIGINT (Ctrl+C elsewhere).
    ///
    /// On Unix the handlers are installed before this returns, so a signal
    /// sent once the caller is serving is never missed.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let signal_clone = signal.clone();
        let waiter = os_signal_waiter();

        tokio::spawn(async move {
            waiter.await;
            signal_clone.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A future that completes when the shutdown signal is triggered.
///
/// Created by [`ShutdownSignal::recv()`].
pub struct ShutdownReceiver {
    triggered: Arc<AtomicBool>,
    wait: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl std::fmt::Debug for ShutdownReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownReceiver")
            .field("triggered", &self.triggered.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Future for ShutdownReceiver {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.triggered.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }

        self.wait.as_mut().poll(cx)
    }
}

/// Installs the SIGTERM and SIGINT handlers and returns a future that
/// completes on the first of them.
///
/// If the handlers cannot be installed the failure is logged and the future
/// never completes, leaving the server running until it is killed.
#[cfg(unix)]
fn os_signal_waiter() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    use tokio::signal::unix::{signal, SignalKind};

    let handlers = signal(SignalKind::terminate())
        .and_then(|sigterm| signal(SignalKind::interrupt()).map(|sigint| (sigterm, sigint)));

    let (mut sigterm, mut sigint) = match handlers {
        Ok(handlers) => handlers,
        Err(error) => {
            tracing::error!(%error, "failed to install signal handlers");
            return Box::pin(std::future::pending());
        }
    };

    Box::pin(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, initiating graceful shutdown");
            }
        }
    })
}

#[cfg(not(unix))]
fn os_signal_waiter() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install Ctrl+C handler");
            return std::future::pending().await;
        }
        tracing::info!("received Ctrl+C, initiating graceful shutdown");
    })
}

/// Counts open connections.
///
/// # Example
///
/// ```rust
/// use wicket_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.acquire();
/// assert_eq!(tracker.active_connections(), 1);
///
/// drop(token);
/// assert_eq!(tracker.active_connections(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Registers a connection. Hold the token for as long as it is open.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until every token has been dropped.
    pub async fn wait_until_idle(&self) {
        loop {
            // Register interest before checking so a concurrent drop is not missed.
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// An open connection, released on drop.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_shutdown_signal_new() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown());
    }

    #[test]
    fn test_trigger_is_idempotent() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_after_trigger_completes() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        tokio::time::timeout(Duration::from_millis(100), signal.recv())
            .await
            .expect("recv should complete immediately");
    }

    #[tokio::test]
    async fn test_recv_wakes_on_trigger_from_other_task() {
        let signal = ShutdownSignal::new();
        let receiver = signal.recv();
        let trigger = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        tokio::time::timeout(Duration::from_secs(1), receiver)
            .await
            .expect("receiver should wake");
    }

    #[test]
    fn test_receiver_pending_until_triggered() {
        let signal = ShutdownSignal::new();
        let mut receiver = tokio_test::task::spawn(signal.recv());

        tokio_test::assert_pending!(receiver.poll());
        signal.trigger();
        assert!(receiver.is_woken());
        tokio_test::assert_ready!(receiver.poll());
    }

    #[tokio::test]
    async fn test_every_receiver_wakes_on_one_trigger() {
        let signal = ShutdownSignal::new();
        let waiters: Vec<_> = (0..8)
            .map(|_| tokio::spawn(signal.recv()))
            .collect();

        let trigger = signal.clone();
        tokio::spawn(async move { trigger.trigger(); });

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("receiver should wake")
                .unwrap();
        }
    }

    #[test]
    fn test_receiver_stays_pending_when_signal_dropped() {
        let signal = ShutdownSignal::new();
        let mut receiver = tokio_test::task::spawn(signal.recv());
        drop(signal);

        tokio_test::assert_pending!(receiver.poll());
    }

    #[test]
    fn test_tracker_counts_tokens() {
        let tracker = ConnectionTracker::new();
        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(tracker.active_connections(), 2);

        drop(first);
        assert_eq!(tracker.active_connections(), 1);
        drop(second);
        assert_eq!(tracker.active_connections(), 0);
    }

    #[tokio::test]
    async fn test_wait_until_idle_without_connections() {
        let tracker = ConnectionTracker::new();
        tokio::time::timeout(Duration::from_millis(100), tracker.wait_until_idle())
            .await
            .expect("should complete immediately");
    }

    #[tokio::test]
    async fn test_wait_until_idle_waits_for_last_token() {
        let tracker = ConnectionTracker::new();
        let tokens: Vec<_> = (0..5).map(|_| tracker.acquire()).collect();

        let handle = tokio::spawn(async move {
            for token in tokens {
                tokio::time::sleep(Duration::from_millis(5)).await;
                drop(token);
            }
        });

        tokio::time::timeout(Duration::from_secs(1), tracker.wait_until_idle())
            .await
            .expect("tracker should drain");
        assert_eq!(tracker.active_connections(), 0);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_until_idle_pending_while_token_held() {
        let tracker = ConnectionTracker::new();
        let _token = tracker.acquire();

        let result =
            tokio::time::timeout(Duration::from_millis(50), tracker.wait_until_idle()).await;
        assert!(result.is_err());
    }
}
