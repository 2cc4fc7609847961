//! Timer configuration and per-timer runtime state

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use xztimer_types::TimerStatus;

use super::listener::TimerListener;

/// Parameters for `TimerRegistry::schedule`.
///
/// Out-of-range values are coerced when scheduled: a negative start becomes
/// 0 and an interval below 1 ms becomes 1 ms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSpec {
    /// Registry key. `None` picks a fresh generated name.
    pub identifier: Option<String>,
    /// Initial remaining (count-down) or elapsed (count-up) time
    pub start_ms: i64,
    pub interval_ms: i64,
    /// When false the timer removes itself after its first tick
    pub repeats: bool,
    pub count_up: bool,
}

impl Default for TimerSpec {
    fn default() -> Self {
        Self {
            identifier: None,
            start_ms: 0,
            interval_ms: 1_000,
            repeats: false,
            count_up: false,
        }
    }
}

impl TimerSpec {
    /// Repeating count-down from `start_ms`
    pub fn countdown(start_ms: i64, interval_ms: i64) -> Self {
        Self {
            start_ms,
            interval_ms,
            repeats: true,
            ..Default::default()
        }
    }

    /// Repeating count-up from zero
    pub fn stopwatch(interval_ms: i64) -> Self {
        Self {
            interval_ms,
            repeats: true,
            count_up: true,
            ..Default::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn repeating(mut self, repeats: bool) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn counting_up(mut self, count_up: bool) -> Self {
        self.count_up = count_up;
        self
    }

    pub(crate) fn coerced_start_ms(&self) -> i64 {
        self.start_ms.max(0)
    }

    pub(crate) fn coerced_interval_ms(&self) -> i64 {
        self.interval_ms.max(1)
    }
}

/// Result of advancing a timer by one interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// New running value, already clamped to ≥ 0
    Value(i64),
    /// Count-down reached zero
    Finished,
}

#[derive(Debug)]
struct HandleState {
    status: TimerStatus,
    value_ms: i64,
    run_duration_ms: f64,
}

/// Registry-owned record for one named timer
pub(crate) struct TimerHandle {
    identifier: Arc<str>,
    interval_ms: i64,
    count_up: bool,
    repeats: bool,
    listener: Arc<dyn TimerListener>,
    state: Mutex<HandleState>,
}

impl TimerHandle {
    pub(crate) fn new(identifier: &str, spec: &TimerSpec, listener: Arc<dyn TimerListener>) -> Self {
        Self {
            identifier: Arc::from(identifier),
            interval_ms: spec.coerced_interval_ms(),
            count_up: spec.count_up,
            repeats: spec.repeats,
            listener,
            state: Mutex::new(HandleState {
                status: TimerStatus::Idle,
                value_ms: spec.coerced_start_ms(),
                run_duration_ms: 0.0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn identifier(&self) -> &Arc<str> {
        &self.identifier
    }

    pub(crate) fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub(crate) fn repeats(&self) -> bool {
        self.repeats
    }

    pub(crate) fn listener(&self) -> Arc<dyn TimerListener> {
        Arc::clone(&self.listener)
    }

    pub(crate) fn status(&self) -> TimerStatus {
        self.lock().status
    }

    pub(crate) fn value_ms(&self) -> i64 {
        self.lock().value_ms
    }

    /// One-third of the interval, the pause/read compensation term
    fn third_interval(&self) -> f64 {
        self.interval_ms as f64 / 3.0
    }

    /// Transition to Running. Returns false if already running.
    pub(crate) fn mark_running(&self) -> bool {
        let mut state = self.lock();
        if state.status == TimerStatus::Running {
            return false;
        }
        state.status = TimerStatus::Running;
        true
    }

    /// Running → Paused, adding a third of an interval to the run duration.
    /// Returns false (and changes nothing) unless running.
    pub(crate) fn pause(&self) -> bool {
        let third = self.third_interval();
        let mut state = self.lock();
        if state.status != TimerStatus::Running {
            return false;
        }
        state.run_duration_ms += third;
        state.status = TimerStatus::Paused;
        true
    }

    /// Advance by one interval
    pub(crate) fn tick(&self) -> TickOutcome {
        let mut state = self.lock();
        state.run_duration_ms += self.interval_ms as f64;

        if self.count_up {
            state.value_ms = state.value_ms.saturating_add(self.interval_ms);
            return TickOutcome::Value(state.value_ms);
        }

        state.value_ms = state.value_ms.saturating_sub(self.interval_ms);
        if state.value_ms <= 0 {
            TickOutcome::Finished
        } else {
            TickOutcome::Value(state.value_ms)
        }
    }

    /// Stored run duration plus the read-time third-interval term
    pub(crate) fn run_duration_ms(&self) -> f64 {
        self.lock().run_duration_ms + self.third_interval()
    }

    pub(crate) fn reset_run_duration(&self) {
        self.lock().run_duration_ms = 0.0;
    }
}
