//! Timer system
//!
//! This module provides:
//! - **Registry**: named timers that count up or down, with pause, resume and
//!   stop, and run-duration accounting
//! - **Periodic source**: the suspendable tokio task behind each timer
//! - **Listener**: the callback sink for ticks and lifecycle events
//! - **Formatting**: milliseconds → (days, hours, minutes, seconds, centis)
//!
//! # Lifecycle
//!
//! ```text
//!   schedule ──► Running ──pause──► Paused
//!                  ▲  │               │
//!                  └──┼───resume──────┘
//!                     │
//!   stop / last tick / count-down at zero ──► removed
//! ```

mod dispatch;
mod error;
mod format;
mod handle;
mod listener;
mod periodic;
mod registry;


pub use error::TimerError;
pub use format::format_time;
pub use handle::TimerSpec;
pub use listener::{CallbackListener, TimerListener};
pub use periodic::{PeriodicSource, SourceState};
pub use registry::TimerRegistry;
