mod cli;
mod config;
mod dates;
mod error;
mod events;
mod export;
mod monitors;
mod mutate;
mod params;
mod polygon;
mod query;
mod registry;
mod schema;
mod session;
mod units;
mod utils;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(cli.config);
    match cli.command {
        Commands::Monitors(args) => monitors::handle(args, &config_path),
        Commands::Get(args) => params::handle_get(args, &config_path),
        Commands::Set(args) => params::handle_set(args, &config_path),
        Commands::Events(args) => events::handle(args, &config_path),
        Commands::Export(args) => export::handle(args, &config_path),
    }
}
