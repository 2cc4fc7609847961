use xztimer_core::{RegistryConfig, RegistryConfigExt, TimeBreakdown, TimerListener, TimerRegistry};

/// Shared state for the REPL: the loaded config and the one registry it drives
pub struct AppState {
    pub config: RegistryConfig,
    pub registry: TimerRegistry,
}

impl AppState {
    /// Load config from disk and create a registry on the current runtime
    pub fn new() -> Result<Self, String> {
        let config = RegistryConfig::load();
        Self::with_config(config)
    }

    pub fn with_config(config: RegistryConfig) -> Result<Self, String> {
        let registry = TimerRegistry::try_new(config.clone()).map_err(|e| e.to_string())?;
        Ok(Self { config, registry })
    }

    pub fn console_listener(&self) -> ConsoleListener {
        ConsoleListener {
            print_ticks: self.config.print_ticks,
        }
    }
}

/// Prints timer output to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleListener {
    pub print_ticks: bool,
}

impl TimerListener for ConsoleListener {
    fn on_formatted_tick(&self, identifier: &str, time: &TimeBreakdown) {
        if self.print_ticks {
            println!("[{identifier}] {time}");
        }
    }

    fn on_finished(&self, identifier: &str) {
        println!("[{identifier}] finished");
    }

    fn on_cancelled(&self, identifier: &str) {
        println!("[{identifier}] stopped");
    }
}
