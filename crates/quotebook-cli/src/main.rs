//! Quotebook CLI - Collect, filter and sync quotes from the terminal

mod cli;
mod commands;
mod config_file;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::autosync::run_autosync;
use crate::commands::clear::run_clear;
use crate::commands::common::AppContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::export::run_export;
use crate::commands::filter::run_filter;
use crate::commands::import::run_import;
use crate::commands::list::{run_categories, run_list};
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::commands::watch::run_watch;
use crate::config_file::{CliConfig, EnvOverrides};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "quotebook=info,quotebook_core=info";

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
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config = CliConfig::load()?;
    let env = EnvOverrides::from_env();
    let context = AppContext {
        db_path: config.resolve_db_path(&env, cli.db_path)?,
        settings: config.resolve_sync_settings(&env, cli.remote_url)?,
    };
    tracing::debug!("Using database at {}", context.db_path.display());

    match cli.command {
        None | Some(Commands::Show) => run_show(&context)?,
        Some(Commands::Add { text, category }) => {
            run_add(&text, category.as_deref(), &context)?;
        }
        Some(Commands::List { all, json }) => run_list(all, json, &context)?,
        Some(Commands::Categories) => run_categories(&context)?,
        Some(Commands::Filter { category }) => run_filter(category.as_deref(), &context)?,
        Some(Commands::Import { path }) => run_import(&path, &context)?,
        Some(Commands::Export { output, stdout }) => {
            run_export(output.as_deref(), stdout, &context)?;
        }
        Some(Commands::Clear { yes }) => run_clear(yes, &context)?,
        Some(Commands::Sync { prefer }) => run_sync(prefer.map(Into::into), &context).await?,
        Some(Commands::Autosync { command }) => run_autosync(&command, &context)?,
        Some(Commands::Watch { interval, prefer }) => {
            run_watch(interval, prefer.map(Into::into), &context).await?;
        }
        Some(Commands::Config { command }) => run_config(command, &context)?,
        Some(Commands::Completions { .. }) => {}
    }

    Ok(())
}
