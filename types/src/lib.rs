//! Shared configuration and value types for XZTimer
//!
//! This crate contains serializable types that are shared between the timer
//! registry (xztimer-core) and whatever renders its output (the REPL binary,
//! or any other collaborator that wants to forward ticks as JSON).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Timer Values
// ─────────────────────────────────────────────────────────────────────────────

/// Five-field formatted time delivered on every formatted tick.
///
/// All fields are pre-rendered strings. `days` is unpadded, `hours`,
/// `minutes` and `seconds` are two digits, `centiseconds` is rendered in
/// tenths with one decimal (e.g. 340 ms → `"3.4"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeBreakdown {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub centiseconds: String,
}

impl TimeBreakdown {
    /// Borrow the fields as a `(days, hours, minutes, seconds, centiseconds)` tuple
    pub fn as_tuple(&self) -> (&str, &str, &str, &str, &str) {
        (
            &self.days,
            &self.hours,
            &self.minutes,
            &self.seconds,
            &self.centiseconds,
        )
    }
}

impl std::fmt::Display for TimeBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}d {}:{}:{} {}",
            self.days, self.hours, self.minutes, self.seconds, self.centiseconds
        )
    }
}

/// Lifecycle state of a registered timer.
///
/// There is no terminal variant: a stopped timer is removed from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimerStatus {
    /// Created but never started
    #[default]
    Idle,
    /// Ticking
    Running,
    /// Suspended by `pause`, fire schedule retained
    Paused,
}

impl TimerStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerStatus::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Prefix for auto-generated identifiers (`{prefix}-{n}`)
    #[serde(default = "default_identifier_prefix")]
    pub identifier_prefix: String,
    /// Interval used by the REPL when a command omits one
    #[serde(default = "default_interval_ms")]
    pub default_interval_ms: i64,
    /// Whether the REPL echoes formatted ticks to stdout
    #[serde(default = "default_print_ticks")]
    pub print_ticks: bool,
}

fn default_identifier_prefix() -> String {
    "timer".to_string()
}

fn default_interval_ms() -> i64 {
    1000
}

fn default_print_ticks() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            identifier_prefix: default_identifier_prefix(),
            default_interval_ms: default_interval_ms(),
            print_ticks: default_print_ticks(),
        }
    }
}
