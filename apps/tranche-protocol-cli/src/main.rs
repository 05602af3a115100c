use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "tranche-protocol")]
#[command(about = "Tranche Protocol CLI - Fixed-supply token sales with staged campaigns")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a sale configuration and print the deployment summary
    ValidateConfig {
        /// Sale configuration file
        config: PathBuf,
    },

    /// Print the bonus tier table for a sale
    ShowSchedule {
        /// Sale configuration file
        config: PathBuf,

        /// Hypothetical start time (RFC3339 or epoch seconds; defaults to now)
        #[arg(short, long)]
        start: Option<String>,
    },

    /// Generate a deterministic allow-list CSV
    GenerateAllowlist {
        /// Number of investors to generate
        #[arg(short, long)]
        count: u64,

        /// Seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output file path
        #[arg(short, long, default_value = "allowlist.csv")]
        output: PathBuf,
    },

    /// Run a scripted sale timeline against an in-memory deployment
    Simulate {
        /// Sale configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Scenario script file
        #[arg(short = 'S', long)]
        script: PathBuf,

        /// Print emitted events as JSON lines
        #[arg(long)]
        json_events: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ValidateConfig { config } => commands::validate_config::execute(config),

        Commands::ShowSchedule { config, start } => commands::show_schedule::execute(config, start),

        Commands::GenerateAllowlist {
            count,
            seed,
            output,
        } => commands::generate_allowlist::execute(count, seed, output),

        Commands::Simulate {
            config,
            script,
            json_events,
        } => commands::simulate::execute(config, script, json_events),
    }
}
