//! Shoplist CLI - Command-line interface for an offline-first shopping list
//!
//! Items are stored locally and pushed to the remote with `shoplist sync`.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::resolve_db_path;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, ItemEdit};
use crate::commands::list::run_list;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
use crate::commands::toggle::run_toggle;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shoplist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path)?;

    match cli.command {
        Commands::Add {
            name,
            quantity,
            note,
        } => {
            run_add(&name, quantity, note.as_deref(), &db_path).await?;
        }
        Commands::List {
            filter,
            search,
            sort,
            json,
        } => {
            run_list(
                filter.into(),
                search.as_deref(),
                sort.into(),
                json,
                &db_path,
            )
            .await?;
        }
        Commands::Edit {
            id,
            name,
            quantity,
            note,
            clear_note,
        } => {
            let edit = ItemEdit {
                name,
                quantity,
                note,
                clear_note,
            };
            run_edit(&id, &edit, &db_path).await?;
        }
        Commands::Toggle { id } => {
            run_toggle(&id, &db_path).await?;
        }
        Commands::Delete { id } => run_delete(&id, &db_path).await?,
        Commands::Sync { failure_rate } => run_sync(failure_rate, &db_path).await?,
        Commands::Status { json } => run_status(json, &db_path).await?,
    }

    Ok(())
}
