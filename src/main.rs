use clap::{Parser, Subcommand};
use std::io::Write;

use xztimer::app_state::AppState;
use xztimer::commands::{self, StartOptions};
use xztimer::{logging, readline};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let state = AppState::new()?;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &state).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    state.registry.clear_all();
    state.registry.flush_callbacks().await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "named timer console")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a timer (replaces any timer with the same id)
    Start {
        #[arg(long)]
        id: Option<String>,
        /// Starting value in milliseconds
        #[arg(short, long, default_value_t = 0)]
        start: i64,
        /// Tick interval in milliseconds
        #[arg(short, long)]
        interval: Option<i64>,
        #[arg(short, long)]
        repeat: bool,
        #[arg(short = 'u', long)]
        count_up: bool,
    },
    Pause {
        id: String,
    },
    Resume {
        id: String,
    },
    Stop {
        id: String,
    },
    Clear,
    List,
    Duration {
        id: String,
    },
    ResetDuration {
        id: String,
    },
    Config,
    SaveConfig,
    Exit,
}

async fn respond(line: &str, state: &AppState) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "xztimer".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Start {
            id,
            start,
            interval,
            repeat,
            count_up,
        }) => {
            commands::start_timer(
                state,
                StartOptions {
                    identifier: id,
                    start_ms: start,
                    interval_ms: interval,
                    repeats: repeat,
                    count_up,
                },
            );
        }
        Some(Commands::Pause { id }) => commands::pause_timer(state, &id),
        Some(Commands::Resume { id }) => commands::resume_timer(state, &id),
        Some(Commands::Stop { id }) => {
            commands::stop_timer(state, &id);
            state.registry.flush_callbacks().await;
        }
        Some(Commands::Clear) => {
            commands::clear_timers(state);
            state.registry.flush_callbacks().await;
        }
        Some(Commands::List) => commands::list_timers(state),
        Some(Commands::Duration { id }) => commands::show_duration(state, &id),
        Some(Commands::ResetDuration { id }) => commands::reset_duration(state, &id),
        Some(Commands::Config) => commands::show_config(state),
        Some(Commands::SaveConfig) => commands::save_config(state)?,
        Some(Commands::Exit) => {
            write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
