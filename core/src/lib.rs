pub mod context;
pub mod timers;

// Re-exports for convenience
pub use context::{ConfigError, RegistryConfigExt};
pub use timers::{
    CallbackListener, PeriodicSource, SourceState, TimerError, TimerListener, TimerRegistry,
    TimerSpec, format_time,
};
pub use xztimer_types::{RegistryConfig, TimeBreakdown, TimerStatus};
