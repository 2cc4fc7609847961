//! Suspendable periodic wakeup source
//!
//! A `PeriodicSource` owns one tokio task that fires a handler at a fixed
//! cadence. The task is created idle and does nothing until the first
//! `resume`, which anchors the schedule to "now" (the first fire is
//! immediate). Suspending keeps the anchor; resuming fires one overdue tick
//! and then continues on the original schedule.
//!
//! # Cancellation
//!
//! Cancelling an idle or suspended source is rejected with
//! [`TimerError::CancelWhileSuspended`]. Callers must resume first.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::error::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Created, never resumed
    Idle,
    Running,
    Suspended,
    /// Terminal; the task has exited or is about to
    Cancelled,
}

impl SourceState {
    fn label(&self) -> &'static str {
        match self {
            SourceState::Idle => "idle",
            SourceState::Running => "running",
            SourceState::Suspended => "suspended",
            SourceState::Cancelled => "cancelled",
        }
    }
}

/// Handle to a periodic task. Dropping it without cancelling ends the task
/// silently.
pub struct PeriodicSource {
    identifier: String,
    control: watch::Sender<SourceState>,
}

impl PeriodicSource {
    /// Spawn an idle periodic task on `runtime` that calls `on_fire` every `period`
    pub fn new<F>(runtime: &Handle, identifier: impl Into<String>, period: Duration, on_fire: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let identifier = identifier.into();
        let (control, rx) = watch::channel(SourceState::Idle);

        runtime.spawn(run_source(identifier.clone(), period, rx, on_fire));

        Self {
            identifier,
            control,
        }
    }

    pub fn state(&self) -> SourceState {
        *self.control.borrow()
    }

    /// Start or continue firing. Returns false if already running or cancelled.
    pub fn resume(&self) -> bool {
        self.control.send_if_modified(|state| match *state {
            SourceState::Idle | SourceState::Suspended => {
                *state = SourceState::Running;
                true
            }
            SourceState::Running | SourceState::Cancelled => false,
        })
    }

    /// Stop firing without losing the schedule. Returns false unless running.
    pub fn suspend(&self) -> bool {
        self.control.send_if_modified(|state| {
            if *state == SourceState::Running {
                *state = SourceState::Suspended;
                true
            } else {
                false
            }
        })
    }

    /// Cancel a running source. Cancelling twice is a no-op.
    pub fn cancel(&self) -> Result<(), TimerError> {
        let mut rejected = None;
        self.control.send_if_modified(|state| match *state {
            SourceState::Running => {
                *state = SourceState::Cancelled;
                true
            }
            SourceState::Cancelled => false,
            SourceState::Idle | SourceState::Suspended => {
                rejected = Some(state.label());
                false
            }
        });

        match rejected {
            Some(state) => Err(TimerError::CancelWhileSuspended {
                identifier: self.identifier.clone(),
                state,
            }),
            None => Ok(()),
        }
    }
}

async fn run_source<F>(
    identifier: String,
    period: Duration,
    mut rx: watch::Receiver<SourceState>,
    mut on_fire: F,
) where
    F: FnMut(),
{
    // Wait for the first resume
    while *rx.borrow_and_update() == SourceState::Idle {
        if rx.changed().await.is_err() {
            return;
        }
    }

    let mut ticker = interval_at(Instant::now(), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let state = *rx.borrow_and_update();
        match state {
            SourceState::Cancelled => {
                tracing::trace!(identifier = %identifier, "periodic source cancelled");
                return;
            }
            SourceState::Idle | SourceState::Suspended => {
                if rx.changed().await.is_err() {
                    return;
                }
            }
            SourceState::Running => {
                let fired = tokio::select! {
                    _ = ticker.tick() => true,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        false
                    }
                };

                // State may have flipped while the tick was pending
                let still_running = *rx.borrow() == SourceState::Running;
                if fired && still_running {
                    on_fire();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_source(period_ms: u64) -> (PeriodicSource, Arc<AtomicUsize>) {
        let fires = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fires);
        let source = PeriodicSource::new(
            &Handle::current(),
            "test",
            Duration::from_millis(period_ms),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        (source, fires)
    }

    #[tokio::test(start_paused = true)]
    async fn idle_source_never_fires() {
        let (source, fires) = counting_source(100);
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 0);
        assert_eq!(source.state(), SourceState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_immediately_then_every_period() {
        let (source, fires) = counting_source(1_000);
        assert!(source.resume());
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        // t = 0, 1000, 2000
        assert_eq!(fires.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn suspended_source_holds_fire() {
        let (source, fires) = counting_source(1_000);
        source.resume();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);

        assert!(source.suspend());
        assert!(!source.suspend());
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);

        // Overdue tick fires on resume
        assert!(source.resume());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_rejected_unless_running() {
        let (source, _fires) = counting_source(1_000);

        let err = source.cancel().unwrap_err();
        assert!(matches!(
            err,
            TimerError::CancelWhileSuspended { state: "idle", .. }
        ));

        source.resume();
        source.suspend();
        assert!(source.cancel().is_err());
        assert_eq!(source.state(), SourceState::Suspended);

        source.resume();
        assert!(source.cancel().is_ok());
        assert_eq!(source.state(), SourceState::Cancelled);
        // Second cancel is a no-op
        assert!(source.cancel().is_ok());
        assert!(!source.resume());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_source_stops_firing() {
        let (source, fires) = counting_source(1_000);
        source.resume();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        source.cancel().unwrap();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(fires.load(Ordering::SeqCst), 2);
    }
}
