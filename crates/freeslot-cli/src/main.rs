use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "freeslot-cli", version, about = "Freeslot CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the earliest free slot across participants' schedules
    FindFreeSpot(commands::find::FindFreeSpotArgs),
    /// List events with their occurrences in a window
    ListEvents(commands::list::ListEventsArgs),
    /// Expand a single event's occurrences in a window
    Expand(commands::expand::ExpandArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::FindFreeSpot(args) => commands::find::run(args),
        Commands::ListEvents(args) => commands::list::run(args),
        Commands::Expand(args) => commands::expand::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
