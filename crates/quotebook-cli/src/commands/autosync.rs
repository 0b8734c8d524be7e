use chrono::Utc;

use crate::cli::AutoSyncCommands;
use crate::commands::common::{
    format_relative_time, format_sync_timestamp, open_app, AppContext,
};
use crate::error::CliError;

pub fn run_autosync(command: &AutoSyncCommands, context: &AppContext) -> Result<(), CliError> {
    let mut app = open_app(context)?;

    match command {
        AutoSyncCommands::On => {
            app.set_auto_sync_enabled(true)?;
            println!(
                "Auto-sync enabled (every {}s). Run `quotebook watch` to start it.",
                context.settings.interval_secs
            );
        }
        AutoSyncCommands::Off => {
            app.set_auto_sync_enabled(false)?;
            println!("Auto-sync disabled");
        }
        AutoSyncCommands::Status => {
            let state = if app.auto_sync_enabled()? {
                "enabled"
            } else {
                "disabled"
            };
            println!("Auto-sync: {state}");
            println!("Interval: {}s", context.settings.interval_secs);
            println!("Remote: {}", context.settings.remote_url);
            match app.last_sync()? {
                Some(timestamp) => println!(
                    "Last sync: {} ({})",
                    format_sync_timestamp(timestamp),
                    format_relative_time(timestamp, Utc::now().timestamp_millis())
                ),
                None => println!("Last sync: never"),
            }
        }
    }

    Ok(())
}
