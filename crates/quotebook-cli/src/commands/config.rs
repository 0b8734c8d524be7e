use std::path::Path;

use quotebook_core::config::SyncSettings;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::AppContext;
use crate::config_file::{default_config_path, CliConfig};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ResolvedConfigView<'a> {
    config_path: String,
    db_path: String,
    #[serde(flatten)]
    settings: &'a SyncSettings,
}

pub fn run_config(command: ConfigCommands, context: &AppContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            remote_url,
            interval,
            remote_limit,
        } => {
            let path = default_config_path()?;
            let config = init_config(&path, remote_url, interval, remote_limit)?;
            println!("Saved config to {}", path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Show => {
            let view = ResolvedConfigView {
                config_path: default_config_path()?.display().to_string(),
                db_path: context.db_path.display().to_string(),
                settings: &context.settings,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

/// Merge the given values into the config at `path`, validate, and save.
pub fn init_config(
    path: &Path,
    remote_url: Option<String>,
    interval: Option<u64>,
    remote_limit: Option<usize>,
) -> Result<CliConfig, CliError> {
    let mut config = CliConfig::load_from_path(path)?;
    if remote_url.is_some() {
        config.remote_url = remote_url;
    }
    if interval.is_some() {
        config.sync_interval_secs = interval;
    }
    if remote_limit.is_some() {
        config.remote_limit = remote_limit;
    }

    let defaults = SyncSettings::default();
    let validated = SyncSettings {
        remote_url: config
            .remote_url
            .clone()
            .unwrap_or(defaults.remote_url),
        interval_secs: config.sync_interval_secs.unwrap_or(defaults.interval_secs),
        remote_limit: config.remote_limit.unwrap_or(defaults.remote_limit),
    }
    .validated()?;
    if config.remote_url.is_some() {
        config.remote_url = Some(validated.remote_url);
    }

    config.save_to_path(path)?;
    Ok(config)
}
