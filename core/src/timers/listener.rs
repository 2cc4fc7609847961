//! Callback sink for timer output
//!
//! Every method has a no-op default so listeners only implement what they
//! need. All calls arrive on the registry's callback context, one at a time.
//! A stopped timer may still deliver one in-flight tick.

use std::sync::Arc;

use xztimer_types::TimeBreakdown;

pub trait TimerListener: Send + Sync + 'static {
    /// Called on every tick, delivered before that tick's formatted value
    fn on_tick(&self, _identifier: &str) {}

    /// Called with the formatted value once at schedule time and after every
    /// non-terminal tick
    fn on_formatted_tick(&self, _identifier: &str, _time: &TimeBreakdown) {}

    /// Called once when a count-down reaches zero
    fn on_finished(&self, _identifier: &str) {}

    /// Called once when the timer is removed
    fn on_cancelled(&self, _identifier: &str) {}
}

/// Listener that ignores everything
impl TimerListener for () {}

impl<T: TimerListener + ?Sized> TimerListener for Arc<T> {
    fn on_tick(&self, identifier: &str) {
        (**self).on_tick(identifier)
    }

    fn on_formatted_tick(&self, identifier: &str, time: &TimeBreakdown) {
        (**self).on_formatted_tick(identifier, time)
    }

    fn on_finished(&self, identifier: &str) {
        (**self).on_finished(identifier)
    }

    fn on_cancelled(&self, identifier: &str) {
        (**self).on_cancelled(identifier)
    }
}

type SignalFn = Box<dyn Fn() + Send + Sync>;
type FormattedFn = Box<dyn Fn(&TimeBreakdown) + Send + Sync>;

/// Closure-backed listener; unset callbacks are skipped
#[derive(Default)]
pub struct CallbackListener {
    tick: Option<SignalFn>,
    formatted: Option<FormattedFn>,
    finished: Option<SignalFn>,
    cancelled: Option<SignalFn>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.tick = Some(Box::new(f));
        self
    }

    pub fn with_formatted_tick(mut self, f: impl Fn(&TimeBreakdown) + Send + Sync + 'static) -> Self {
        self.formatted = Some(Box::new(f));
        self
    }

    pub fn with_finished(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.finished = Some(Box::new(f));
        self
    }

    pub fn with_cancelled(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.cancelled = Some(Box::new(f));
        self
    }
}

impl TimerListener for CallbackListener {
    fn on_tick(&self, _identifier: &str) {
        if let Some(f) = &self.tick {
            f();
        }
    }

    fn on_formatted_tick(&self, _identifier: &str, time: &TimeBreakdown) {
        if let Some(f) = &self.formatted {
            f(time);
        }
    }

    fn on_finished(&self, _identifier: &str) {
        if let Some(f) = &self.finished {
            f();
        }
    }

    fn on_cancelled(&self, _identifier: &str) {
        if let Some(f) = &self.cancelled {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn unset_callbacks_are_skipped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let listener = CallbackListener::new().with_tick(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listener.on_tick("a");
        listener.on_finished("a");
        listener.on_cancelled("a");
        listener.on_formatted_tick("a", &TimeBreakdown::default());

        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    fn deliver_all(listener: &impl TimerListener) {
        listener.on_tick("a");
        listener.on_formatted_tick("a", &TimeBreakdown::default());
        listener.on_finished("a");
        listener.on_cancelled("a");
    }

    #[test]
    fn builders_route_to_trait_callbacks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (t, f, d, c) = (Arc::clone(&calls), Arc::clone(&calls), Arc::clone(&calls), Arc::clone(&calls));
        let listener = CallbackListener::new()
            .with_tick(move || {
                t.fetch_add(1, Ordering::SeqCst);
            })
            .with_formatted_tick(move |_| {
                f.fetch_add(10, Ordering::SeqCst);
            })
            .with_finished(move || {
                d.fetch_add(100, Ordering::SeqCst);
            })
            .with_cancelled(move || {
                c.fetch_add(1_000, Ordering::SeqCst);
            });

        deliver_all(&listener);
        assert_eq!(calls.load(Ordering::SeqCst), 1_111);
    }

    #[test]
    fn arc_forwards_to_inner_listener() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);
        let listener: Arc<dyn TimerListener> = Arc::new(CallbackListener::new().with_cancelled(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        listener.on_cancelled("a");
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }
}
