use std::io;
use std::ops::ControlFlow;
use std::time::Duration;

use quotebook_core::sync::{run_auto_sync, SyncOutcome};
use quotebook_core::{Resolution, Result as CoreResult, SharedApp};
use tokio::sync::watch;

use crate::commands::common::{format_sync_summary, open_app, stdin_is_interactive, AppContext};
use crate::commands::sync::settle_conflicts;
use crate::error::CliError;

/// Run auto-sync in the foreground until Ctrl+C or until the persisted
/// preference is turned off.
///
/// A pass that ends in conflicts stops the loop immediately so the conflicts
/// can be settled; the loop then resumes.
pub async fn run_watch(
    interval_override: Option<u64>,
    prefer: Option<Resolution>,
    context: &AppContext,
) -> Result<(), CliError> {
    let app = open_app(context)?;
    if !app.auto_sync_enabled()? {
        return Err(CliError::AutoSyncDisabled);
    }

    let period = match interval_override {
        Some(0) => {
            return Err(CliError::Config(
                "--interval must be at least 1 second".to_string(),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
        None => context.settings.interval(),
    };

    let shared = SharedApp::new(app);
    println!(
        "Auto-sync every {}s against {} (Ctrl+C to stop)",
        period.as_secs(),
        context.settings.remote_url
    );

    let mut total_passes = 0;
    loop {
        let (_switch_tx, switch_rx) = watch::channel(true);
        let mut conflicted = false;

        let passes = tokio::select! {
            result = run_auto_sync(&shared, period, switch_rx, |result| {
                let flow = handle_pass(result);
                conflicted = flow.is_break();
                flow
            }) => result?,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                println!("Stopping auto-sync");
                return Ok(());
            }
        };
        total_passes += passes;

        if !conflicted {
            break;
        }

        let mut guard = shared.lock().await;
        let interactive = prefer.is_none() && stdin_is_interactive();
        settle_conflicts(
            &mut *guard,
            prefer,
            interactive,
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )?;
    }

    println!("Auto-sync stopped after {total_passes} pass(es)");
    Ok(())
}

/// Report one pass; conflicts stop the loop so they can be settled.
pub fn handle_pass(result: &CoreResult<SyncOutcome>) -> ControlFlow<()> {
    match result {
        Ok(SyncOutcome::Committed(summary)) => println!("{}", format_sync_summary(summary)),
        Ok(SyncOutcome::ConflictsPending(conflicts)) => {
            println!("{} conflict(s) need a decision", conflicts.len());
            return ControlFlow::Break(());
        }
        Err(error) => eprintln!("Sync failed: {error}"),
    }
    ControlFlow::Continue(())
}
