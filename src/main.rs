mod aggregate;
mod cli;
mod config;
mod error;
mod output;
mod panel;
mod percentile;
mod reading;
mod spatial;

use anyhow::Result;
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .try_init();

    let cli = Cli::parse();

    let outcome = match &cli.command {
        Commands::Panel(args) => command::panel(args).await,
        Commands::Distance(args) => command::distance(args).await,
    };

    match outcome {
        Ok(filename) => println!("File saved to `{}`", filename),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}
