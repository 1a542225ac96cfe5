use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "paretojournal", version, about = "Pareto Journal CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open and inspect daily pages
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Main and secondary task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Month focus management
    Month {
        #[command(subcommand)]
        action: commands::month::MonthAction,
    },
    /// Gratitude lines
    Gratitude {
        #[command(subcommand)]
        action: commands::reflection::GratitudeAction,
    },
    /// Financial affirmation
    Affirmation {
        #[command(subcommand)]
        action: commands::reflection::AffirmationAction,
    },
    /// Resolve skipped days
    Skipped {
        #[command(subcommand)]
        action: commands::skipped::SkippedAction,
    },
    /// Weekly review eligibility
    Review {
        #[command(subcommand)]
        action: commands::review::ReviewAction,
    },
    /// Export, import and reset journal data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PARETOJOURNAL_LOG").unwrap_or_else(|_| {
        let level = paretojournal_core::Config::load_or_default().log.level;
        EnvFilter::new(format!("warn,paretojournal_core={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Day { action } => commands::day::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Month { action } => commands::month::run(action),
        Commands::Gratitude { action } => commands::reflection::run_gratitude(action),
        Commands::Affirmation { action } => commands::reflection::run_affirmation(action),
        Commands::Skipped { action } => commands::skipped::run(action),
        Commands::Review { action } => commands::review::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
