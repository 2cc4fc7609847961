//! Error types for timer operations

use thiserror::Error;

/// Errors raised by the periodic primitive and registry construction
#[derive(Debug, Error)]
pub enum TimerError {
    /// A periodic source may only be cancelled while running
    #[error("cannot cancel timer source '{identifier}' while it is {state}")]
    CancelWhileSuspended {
        identifier: String,
        state: &'static str,
    },

    #[error("no tokio runtime available to drive timers")]
    RuntimeUnavailable(#[source] tokio::runtime::TryCurrentError),
}
