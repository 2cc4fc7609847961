//! Named timer registry
//!
//! The registry owns every active timer, keyed by identifier. Each timer is a
//! [`TimerHandle`] (its running value and accounting) paired with a
//! [`PeriodicSource`] (the task that wakes it up).
//!
//! # Cancellation ordering
//!
//! A periodic source refuses to be cancelled while idle or suspended. `stop`
//! and `clear_all` therefore always force a timer back to `Running` before
//! cancelling it. If the source still refuses, the registry logs the fault,
//! counts it in [`TimerRegistry::fault_count`] and removes the timer anyway.
//!
//! # Locking
//!
//! The identifier map sits behind one mutex. Ticks run on the source tasks
//! outside that lock and only take it to remove a finished timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use hashbrown::HashMap;
use tokio::runtime::Handle;
use xztimer_types::{RegistryConfig, TimerStatus};

use super::dispatch::CallbackDispatcher;
use super::error::TimerError;
use super::format::format_time;
use super::handle::{TickOutcome, TimerHandle, TimerSpec};
use super::listener::TimerListener;
use super::periodic::PeriodicSource;

struct TimerEntry {
    handle: Arc<TimerHandle>,
    source: PeriodicSource,
}

struct RegistryInner {
    runtime: Handle,
    config: RegistryConfig,
    timers: Mutex<HashMap<String, TimerEntry>>,
    dispatcher: CallbackDispatcher,
    next_id: AtomicU64,
    faults: AtomicU64,
}

/// Thread-safe registry of named timers.
///
/// Cloning is cheap and every clone refers to the same timers. Operations on
/// an unknown identifier are silent no-ops.
#[derive(Clone)]
pub struct TimerRegistry {
    inner: Arc<RegistryInner>,
}

impl TimerRegistry {
    /// Create a registry with the default config on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use [`Self::try_new`] or
    /// [`Self::with_runtime`] there.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_runtime(Handle::current(), config)
    }

    pub fn try_new(config: RegistryConfig) -> Result<Self, TimerError> {
        let runtime = Handle::try_current().map_err(TimerError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(runtime, config))
    }

    /// Create a registry whose timers and callbacks run on `runtime`
    pub fn with_runtime(runtime: Handle, config: RegistryConfig) -> Self {
        let dispatcher = CallbackDispatcher::spawn(&runtime);
        Self {
            inner: Arc::new(RegistryInner {
                runtime,
                config,
                timers: Mutex::new(HashMap::new()),
                dispatcher,
                next_id: AtomicU64::new(0),
                faults: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Create and start a timer, replacing any timer under the same identifier.
    ///
    /// The starting value is queued to `on_formatted_tick` before the first
    /// tick can run. The first tick fires immediately. Returns the identifier
    /// the timer was registered under.
    pub fn schedule(&self, spec: TimerSpec, listener: impl TimerListener) -> String {
        self.inner.schedule(spec, Arc::new(listener))
    }

    /// Cancel and remove a timer. `on_cancelled` fires exactly once.
    pub fn stop(&self, identifier: &str) {
        self.inner.stop(identifier);
    }

    /// Suspend a running timer. No-op unless running.
    pub fn pause(&self, identifier: &str) {
        let timers = self.inner.timers();
        let Some(entry) = timers.get(identifier) else {
            return;
        };
        if entry.handle.pause() {
            entry.source.suspend();
            tracing::debug!(identifier, "timer paused");
        }
    }

    /// Resume an idle or paused timer from where it was suspended. No-op if running.
    pub fn resume(&self, identifier: &str) {
        let timers = self.inner.timers();
        let Some(entry) = timers.get(identifier) else {
            return;
        };
        if entry.handle.mark_running() {
            entry.source.resume();
            tracing::debug!(identifier, "timer resumed");
        }
    }

    /// Stop every timer and empty the registry
    pub fn clear_all(&self) {
        let mut timers = self.inner.timers();
        let count = timers.len();
        for (identifier, entry) in timers.drain() {
            self.inner.retire(&identifier, entry);
        }
        tracing::debug!(count, "cleared all timers");
    }

    /// Accumulated run time in milliseconds, plus a third of the interval.
    ///
    /// The extra third is added on every read and is never stored. Returns 0
    /// for an unknown identifier.
    pub fn run_duration(&self, identifier: &str) -> f64 {
        self.inner
            .timers()
            .get(identifier)
            .map(|entry| entry.handle.run_duration_ms())
            .unwrap_or(0.0)
    }

    /// Zero the accumulated run time without touching the timer's state
    pub fn reset_run_duration(&self, identifier: &str) {
        if let Some(entry) = self.inner.timers().get(identifier) {
            entry.handle.reset_run_duration();
        }
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.inner.timers().contains_key(identifier)
    }

    pub fn status(&self, identifier: &str) -> Option<TimerStatus> {
        self.inner
            .timers()
            .get(identifier)
            .map(|entry| entry.handle.status())
    }

    pub fn len(&self) -> usize {
        self.inner.timers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.timers().is_empty()
    }

    /// Sorted snapshot of registered identifiers
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.timers().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of cancellations the periodic primitive refused
    pub fn fault_count(&self) -> u64 {
        self.inner.faults.load(Ordering::Relaxed)
    }

    /// Wait until every callback queued so far has been delivered
    pub async fn flush_callbacks(&self) {
        self.inner.dispatcher.flush().await;
    }
}

impl RegistryInner {
    fn timers(&self) -> MutexGuard<'_, HashMap<String, TimerEntry>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(self: &Arc<Self>, spec: TimerSpec, listener: Arc<dyn TimerListener>) -> String {
        let mut timers = self.timers();

        let identifier = match &spec.identifier {
            Some(identifier) => {
                if let Some(previous) = timers.remove(identifier.as_str()) {
                    tracing::debug!(identifier = %identifier, "replacing existing timer");
                    self.retire(identifier, previous);
                }
                identifier.clone()
            }
            None => self.generate_identifier(&timers),
        };

        let handle = Arc::new(TimerHandle::new(&identifier, &spec, listener));

        // Starting value goes out before the source can fire
        let start = format_time(handle.value_ms());
        let listener = handle.listener();
        let id = Arc::clone(handle.identifier());
        self.dispatcher
            .dispatch(move || listener.on_formatted_tick(&id, &start));

        let weak = Arc::downgrade(self);
        let tick_handle = Arc::clone(&handle);
        let source = PeriodicSource::new(
            &self.runtime,
            identifier.clone(),
            Duration::from_millis(handle.interval_ms().unsigned_abs()),
            move || on_tick(&weak, &tick_handle),
        );

        handle.mark_running();
        source.resume();

        tracing::debug!(
            identifier = %identifier,
            start_ms = handle.value_ms(),
            interval_ms = handle.interval_ms(),
            repeats = spec.repeats,
            count_up = spec.count_up,
            "timer scheduled"
        );

        timers.insert(identifier.clone(), TimerEntry { handle, source });
        identifier
    }

    /// `{prefix}-{n}` from a monotonic counter, skipping names already taken
    fn generate_identifier(&self, timers: &HashMap<String, TimerEntry>) -> String {
        loop {
            let n = self.next_id.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{}-{}", self.config.identifier_prefix, n);
            if !timers.contains_key(candidate.as_str()) {
                return candidate;
            }
        }
    }

    fn stop(&self, identifier: &str) {
        let mut timers = self.timers();
        if let Some(entry) = timers.remove(identifier) {
            self.retire(identifier, entry);
        }
    }

    /// Stop issued from a tick. Only removes the entry if it still belongs to
    /// `handle`, so a stale tick cannot stop a replacement timer.
    fn stop_from_tick(&self, handle: &Arc<TimerHandle>) {
        let mut timers = self.timers();
        let identifier: &str = handle.identifier();
        let owned = timers
            .get(identifier)
            .is_some_and(|entry| Arc::ptr_eq(&entry.handle, handle));
        if !owned {
            return;
        }
        if let Some(entry) = timers.remove(identifier) {
            self.retire(identifier, entry);
        }
    }

    /// Cancel a timer already removed from the map and queue `on_cancelled`
    fn retire(&self, identifier: &str, entry: TimerEntry) {
        // Force Running before cancel
        if entry.handle.mark_running() {
            entry.source.resume();
        }

        if let Err(err) = entry.source.cancel() {
            self.faults.fetch_add(1, Ordering::Relaxed);
            tracing::error!(identifier, error = %err, "periodic source refused cancellation");
        }

        let listener = entry.handle.listener();
        let id = Arc::clone(entry.handle.identifier());
        self.dispatcher.dispatch(move || listener.on_cancelled(&id));

        tracing::debug!(identifier, "timer stopped");
    }
}

impl Drop for RegistryInner {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        let drained: Vec<_> = timers.drain().collect();
        for (identifier, entry) in drained {
            self.retire(&identifier, entry);
        }
    }
}

fn on_tick(registry: &Weak<RegistryInner>, handle: &Arc<TimerHandle>) {
    let Some(registry) = registry.upgrade() else {
        return;
    };

    let outcome = handle.tick();
    let listener = handle.listener();
    let id = Arc::clone(handle.identifier());

    tracing::trace!(identifier = %id, ?outcome, "timer tick");

    match outcome {
        TickOutcome::Finished => {
            registry.dispatcher.dispatch(move || {
                listener.on_tick(&id);
                listener.on_finished(&id);
            });
            registry.stop_from_tick(handle);
            return;
        }
        TickOutcome::Value(value_ms) => {
            let time = format_time(value_ms);
            registry.dispatcher.dispatch(move || {
                listener.on_tick(&id);
                listener.on_formatted_tick(&id, &time);
            });
        }
    }

    if !handle.repeats() {
        registry.stop_from_tick(handle);
    }
}
