use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod analysis;
mod cli;
mod config;
mod error;
mod item;
mod output;
mod pipeline;
mod provider;
#[cfg(test)]
mod testing;
mod view;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("chapterviz=debug")
    } else {
        EnvFilter::new("chapterviz=warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Schema => cli::schema::execute(),
    }
}
