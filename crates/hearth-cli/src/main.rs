use clap::{Parser, Subcommand};
use hearth_core::storage::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "hearth", version, about = "Household pantry, menus, tasks and daily timers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pantry stock
    Stock {
        #[command(subcommand)]
        action: commands::stock::StockAction,
    },
    /// Menu planning, cooking and nutrition
    Menu {
        #[command(subcommand)]
        action: commands::menu::MenuAction,
    },
    /// To-do and shopping tasks
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Recurring reminders
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// First-connection monitor and daily timers
    Monitor {
        #[command(subcommand)]
        action: commands::monitor::MonitorAction,
    },
    /// Restock alerts
    Alert {
        #[command(subcommand)]
        action: commands::alert::AlertAction,
    },
    /// Run a voice or Telegram announcement now
    Announce(commands::announce::AnnounceArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(Config::load_or_default().log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Stock { action } => commands::stock::run(action).await,
        Commands::Menu { action } => commands::menu::run(action).await,
        Commands::Task { action } => commands::task::run(action).await,
        Commands::Reminder { action } => commands::reminder::run(action).await,
        Commands::Monitor { action } => commands::monitor::run(action).await,
        Commands::Alert { action } => commands::alert::run(action).await,
        Commands::Announce(args) => commands::announce::run(args).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
