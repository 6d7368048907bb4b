use std::path::PathBuf;

use alertcast_cli::commands::{self, TimerArgs};
use alertcast_cli::logging;
use alertcast_core::context::AppSettings;
use alertcast_types::TimerKind;
use clap::{Parser, Subcommand, ValueEnum};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let cli = Cli::parse();
    let settings = AppSettings::load();

    match cli.command {
        Commands::Check { config } => {
            commands::check(&config.unwrap_or_else(|| settings.overlay_config.clone()))
        }
        Commands::Replay {
            config,
            events,
            seed,
        } => commands::replay(
            &config.unwrap_or_else(|| settings.overlay_config.clone()),
            &events,
            seed,
            &settings,
        ),
        Commands::Play { config } => {
            let config = config.unwrap_or_else(|| settings.overlay_config.clone());
            commands::play(&config, &settings).await
        }
        Commands::Timer {
            id,
            kind,
            store,
            persistent,
            initial_ms,
            paused,
            show_ms,
        } => {
            let store = store.unwrap_or_else(|| settings.timer_store_dir.clone());
            let args = TimerArgs {
                id,
                kind: kind.into(),
                persistent,
                initial_ms,
                paused,
                show_ms,
            };
            commands::timer(args, &store, &settings).await
        }
    }
}

#[derive(Parser)]
#[command(name = "alertcast", about = "Stream alert overlay engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate an overlay config
    Check {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay a timed JSONL event log in virtual time
    Replay {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        events: PathBuf,
        /// Seed for variant and happy-word selection
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run an overlay live, reading transport messages from stdin
    Play {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a timer replica against a shared directory store
    Timer {
        #[arg(long)]
        id: String,
        #[arg(long, value_enum, default_value_t = KindArg::Stopwatch)]
        kind: KindArg,
        #[arg(long)]
        store: Option<PathBuf>,
        #[arg(long)]
        persistent: bool,
        /// Starting value in milliseconds
        #[arg(long, default_value_t = 0)]
        initial_ms: i64,
        /// Load without starting the clock
        #[arg(long)]
        paused: bool,
        #[arg(long)]
        show_ms: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Stopwatch,
    Countdown,
    Marathon,
}

impl From<KindArg> for TimerKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Stopwatch => TimerKind::Stopwatch,
            KindArg::Countdown => TimerKind::Countdown,
            KindArg::Marathon => TimerKind::Marathon,
        }
    }
}
