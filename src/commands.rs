use xztimer_core::{RegistryConfigExt, TimerSpec};

use crate::app_state::AppState;

/// Options for `start`, already parsed from the command line
pub struct StartOptions {
    pub identifier: Option<String>,
    pub start_ms: i64,
    pub interval_ms: Option<i64>,
    pub repeats: bool,
    pub count_up: bool,
}

pub fn start_timer(state: &AppState, options: StartOptions) -> String {
    let spec = TimerSpec {
        identifier: options.identifier,
        start_ms: options.start_ms,
        interval_ms: options
            .interval_ms
            .unwrap_or(state.config.default_interval_ms),
        repeats: options.repeats,
        count_up: options.count_up,
    };
    let id = state.registry.schedule(spec, state.console_listener());
    println!("started {id}");
    id
}

pub fn pause_timer(state: &AppState, id: &str) {
    state.registry.pause(id);
    print_status(state, id);
}

pub fn resume_timer(state: &AppState, id: &str) {
    state.registry.resume(id);
    print_status(state, id);
}

pub fn stop_timer(state: &AppState, id: &str) {
    if !state.registry.exists(id) {
        println!("no timer named {id}");
    }
    state.registry.stop(id);
}

pub fn clear_timers(state: &AppState) {
    let count = state.registry.len();
    state.registry.clear_all();
    println!("cleared {count} timers");
}

pub fn list_timers(state: &AppState) {
    let ids = state.registry.identifiers();
    if ids.is_empty() {
        println!("No timers running");
        return;
    }

    println!("{:<24} {:<10} {:>14}", "Timer", "Status", "Run (ms)");
    println!("{}", "-".repeat(50));
    for id in ids {
        // The timer may finish between the snapshot and this read
        let Some(status) = state.registry.status(&id) else {
            continue;
        };
        println!(
            "{:<24} {:<10} {:>14.1}",
            id,
            status.label(),
            state.registry.run_duration(&id)
        );
    }
}

pub fn show_duration(state: &AppState, id: &str) {
    println!("{id}: {:.1} ms", state.registry.run_duration(id));
}

pub fn reset_duration(state: &AppState, id: &str) {
    state.registry.reset_run_duration(id);
    show_duration(state, id);
}

pub fn show_config(state: &AppState) {
    let config = &state.config;
    println!("identifier_prefix   = {}", config.identifier_prefix);
    println!("default_interval_ms = {}", config.default_interval_ms);
    println!("print_ticks         = {}", config.print_ticks);
}

pub fn save_config(state: &AppState) -> Result<(), String> {
    state.config.save().map_err(|e| e.to_string())?;
    println!("configuration saved");
    Ok(())
}

fn print_status(state: &AppState, id: &str) {
    match state.registry.status(id) {
        Some(status) => println!("{id}: {}", status.label()),
        None => println!("no timer named {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xztimer_core::{RegistryConfig, TimerStatus};

    fn quiet_state() -> AppState {
        AppState::with_config(RegistryConfig {
            print_ticks: false,
            default_interval_ms: 250,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn start_uses_configured_default_interval() {
        let state = quiet_state();
        let id = start_timer(
            &state,
            StartOptions {
                identifier: None,
                start_ms: 0,
                interval_ms: None,
                repeats: true,
                count_up: true,
            },
        );

        assert_eq!(id, "timer-0");
        // No ticks yet: only the read-time third of 250 ms
        assert!((state.registry.run_duration(&id) - 250.0 / 3.0).abs() < 1e-9);
        clear_timers(&state);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_resume_stop_round_trip() {
        let state = quiet_state();
        let id = start_timer(
            &state,
            StartOptions {
                identifier: Some("lap".to_string()),
                start_ms: 5_000,
                interval_ms: Some(1_000),
                repeats: true,
                count_up: false,
            },
        );

        pause_timer(&state, &id);
        assert_eq!(state.registry.status(&id), Some(TimerStatus::Paused));
        resume_timer(&state, &id);
        assert_eq!(state.registry.status(&id), Some(TimerStatus::Running));
        stop_timer(&state, &id);
        assert!(!state.registry.exists(&id));
        assert_eq!(state.registry.fault_count(), 0);
    }
}
