//! Graceful shutdown control shared by the backend and the gateway.
//!
//! A [`ShutdownController`] carries three things: a watch channel that server
//! loops select on to stop accepting new work, a health state that probes and
//! middleware can inspect, and an atomic in-flight counter updated through
//! RAII guards so a draining server knows when every accepted call has
//! finished.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Server health state.
///
/// Transitions: Starting -> Ready -> Draining -> Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Initializing; not yet accepting requests.
    Starting,
    /// Accepting requests.
    Ready,
    /// Shutdown signalled; finishing in-flight requests.
    Draining,
    /// Fully drained.
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Starting => "starting",
            HealthState::Ready => "ready",
            HealthState::Draining => "draining",
            HealthState::Stopped => "stopped",
        }
    }
}

/// Coordinates graceful shutdown for one server process.
#[derive(Debug)]
pub struct ShutdownController {
    signal: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal,
            in_flight: Arc::new(AtomicU64::new(0)),
            state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    /// Marks the server ready to accept requests.
    pub fn set_ready(&self) {
        self.state.store(Arc::new(HealthState::Ready));
    }

    /// Returns a receiver that resolves when shutdown begins.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    /// Moves to `Draining` and notifies every subscriber. New requests
    /// should be refused from this point on.
    pub fn begin_drain(&self) {
        self.state.store(Arc::new(HealthState::Draining));
        // A send error just means no receiver is alive anymore.
        let _ = self.signal.send(true);
    }

    #[must_use]
    pub fn state(&self) -> HealthState {
        **self.state.load()
    }

    /// Registers an in-flight request. The counter drops with the guard,
    /// including during unwinding, so drained counts stay accurate when a
    /// handler panics.
    #[must_use]
    pub fn track(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits until every in-flight request has finished, up to `timeout`.
    ///
    /// Returns `true` (and moves to `Stopped`) on a complete drain; `false`
    /// if the timeout expired first, leaving the state at `Draining`.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.in_flight.load(Ordering::Relaxed) == 0 {
                self.state.store(Arc::new(HealthState::Stopped));
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for one in-flight request.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_starting_state_with_nothing_in_flight() {
        let ctrl = ShutdownController::new();
        assert_eq!(ctrl.state(), HealthState::Starting);
        assert_eq!(ctrl.in_flight(), 0);
    }

    #[test]
    fn state_machine_walks_forward() {
        let ctrl = ShutdownController::new();
        ctrl.set_ready();
        assert_eq!(ctrl.state(), HealthState::Ready);
        ctrl.begin_drain();
        assert_eq!(ctrl.state(), HealthState::Draining);
    }

    #[test]
    fn guards_count_up_and_down() {
        let ctrl = ShutdownController::new();
        let a = ctrl.track();
        let b = ctrl.track();
        assert_eq!(ctrl.in_flight(), 2);
        drop(a);
        assert_eq!(ctrl.in_flight(), 1);
        drop(b);
        assert_eq!(ctrl.in_flight(), 0);
    }

    #[tokio::test]
    async fn subscribers_see_the_drain_signal() {
        let ctrl = ShutdownController::new();
        let mut rx = ctrl.subscribe();
        assert!(!*rx.borrow());

        ctrl.begin_drain();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn drain_completes_immediately_when_idle() {
        let ctrl = ShutdownController::new();
        ctrl.set_ready();
        ctrl.begin_drain();

        assert!(ctrl.drain(Duration::from_secs(1)).await);
        assert_eq!(ctrl.state(), HealthState::Stopped);
    }

    #[tokio::test]
    async fn drain_waits_for_outstanding_guards() {
        let ctrl = ShutdownController::new();
        ctrl.set_ready();
        let guard = ctrl.track();
        ctrl.begin_drain();

        let release = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(ctrl.drain(Duration::from_secs(2)).await);
        assert_eq!(ctrl.state(), HealthState::Stopped);
        release.await.unwrap();
    }

    #[tokio::test]
    async fn drain_times_out_while_guards_remain() {
        let ctrl = ShutdownController::new();
        ctrl.set_ready();
        let _guard = ctrl.track();
        ctrl.begin_drain();

        assert!(!ctrl.drain(Duration::from_millis(50)).await);
        assert_eq!(ctrl.state(), HealthState::Draining);
    }
}
