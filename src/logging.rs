//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/xztimer/xztimer.log` (or platform equivalent)
//! with 10 MB size-based rotation. Console output goes to stderr so it does
//! not interleave with REPL output on stdout. Set `DEBUG_LOGGING=1` to enable
//! debug output for xztimer crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the program lifetime so
/// buffered logs are flushed on shutdown. Falls back to stderr-only logging
/// (and returns `None`) when the log file cannot be created.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = dirs::config_dir().map(|config| config.join("xztimer")) else {
        init_stderr_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // Subscriber not installed yet
        eprintln!(
            "Failed to create log directory {:?}: {}, using stderr only",
            log_dir, e
        );
        init_stderr_only(debug_logging);
        return None;
    }

    let log_path = log_dir.join("xztimer.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(MAX_LOG_SIZE),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {:?}: {}", log_path, e);
            init_stderr_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "xztimer logging initialized");

    Some(guard)
}

fn init_stderr_only(debug_logging: bool) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "xztimer logging initialized (stderr only)");
}

fn filter(debug_logging: bool) -> EnvFilter {
    let directive = if debug_logging {
        "warn,xztimer=debug,xztimer_core=debug"
    } else {
        "warn"
    };
    EnvFilter::new(directive)
}
