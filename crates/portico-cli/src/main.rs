//! Portico CLI - Validate manifests and inspect port contracts

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `schema` output stays pipeable
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_command(cli))
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { path, resolve } => {
            commands::validate::run(&path, resolve).await?;
        }

        Commands::Schema { adapter } => {
            commands::schema::run(adapter)?;
        }

        Commands::Ports { json } => {
            commands::ports::run(json)?;
        }
    }

    Ok(())
}
