//! crosstile CLI - Command-line interface
//!
//! Replays tile lifecycle traces against the cross-tile symbol index and
//! inspects the composite keys used to match labels between tiles.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::key::KeyArgs;
use commands::replay::ReplayArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "crosstile")]
#[command(version, about = "Cross-tile symbol deduplication tools", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON trace of tile add/remove events and report the result
    Replay(ReplayArgs),

    /// Print the composite key of a symbol anchor
    Key(KeyArgs),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Key(args) => commands::key::run(args),
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
