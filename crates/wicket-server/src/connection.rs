//! Per-connection request activity.
//!
//! A keep-alive connection that has had no request in flight for the idle
//! timeout is closed. [`ConnectionActivity`] records when a connection last
//! went quiet so the connection task can tell.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Activity {
    in_flight: usize,
    since: Instant,
}

/// Request activity on one connection.
#[derive(Debug, Clone)]
pub(crate) struct ConnectionActivity {
    sender: watch::Sender<Activity>,
}

impl ConnectionActivity {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(Activity {
            in_flight: 0,
            since: Instant::now(),
        });
        Self { sender }
    }

    /// Marks a request as in flight until the guard is dropped.
    pub(crate) fn begin(&self) -> RequestGuard {
        self.sender.send_modify(|activity| {
            activity.in_flight += 1;
            activity.since = Instant::now();
        });
        RequestGuard {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.sender.borrow().in_flight
    }

    /// Completes once the connection has been quiet for `timeout`.
    pub(crate) async fn idle_for(&self, timeout: Duration) {
        let mut receiver = self.sender.subscribe();
        loop {
            let activity = *receiver.borrow_and_update();
            if activity.in_flight > 0 {
                if receiver.changed().await.is_err() {
                    return std::future::pending().await;
                }
                continue;
            }

            tokio::select! {
                () = tokio::time::sleep_until(activity.since + timeout) => return,
                changed = receiver.changed() => {
                    if changed.is_err() {
                        return std::future::pending().await;
                    }
                }
            }
        }
    }
}

/// A request in flight on a connection.
#[derive(Debug)]
pub(crate) struct RequestGuard {
    sender: watch::Sender<Activity>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.sender.send_modify(|activity| {
            activity.in_flight = activity.in_flight.saturating_sub(1);
            activity.since = Instant::now();
        });
    }
}
