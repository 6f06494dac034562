use anyhow::Result;
use clap::Parser;
use journal_core::config::AppConfig;
use journal_core::lifecycle;

mod cli;
mod commands;
mod setup;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    lifecycle::init_tracing();
    lifecycle::log_startup();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref());
    let path = setup::journal_path(cli.journal.as_deref(), &config);

    match cli.command {
        Commands::New { force } => commands::new_journal(path, force).await?,
        Commands::Write { date, text } => commands::write(path, date, text).await?,
        Commands::Read { date } => commands::read(path, date).await?,
        Commands::Remove { date } => commands::remove(path, date).await?,
        Commands::List { json } => commands::list(path, json).await?,
        Commands::Nav { direction, from } => {
            commands::nav(path, config.navigation.navigator(), direction, from).await?
        }
        Commands::Calendar { month } => commands::calendar(path, month).await?,
        Commands::Info => commands::info(path).await?,
    }

    lifecycle::log_shutdown();
    Ok(())
}
