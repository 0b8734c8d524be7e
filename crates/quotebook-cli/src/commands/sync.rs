use std::io::{self, BufRead, Write};

use quotebook_core::db::KeyValueStore;
use quotebook_core::sync::{RemoteSource, ResolveOutcome, SyncOutcome};
use quotebook_core::{QuoteApp, Resolution};

use crate::commands::common::{
    format_conflict_lines, format_sync_summary, open_app, prompt_resolution,
    stdin_is_interactive, AppContext,
};
use crate::error::CliError;

pub async fn run_sync(prefer: Option<Resolution>, context: &AppContext) -> Result<(), CliError> {
    let mut app = open_app(context)?;
    println!("Syncing with {}...", context.settings.remote_url);

    match app.sync().await? {
        SyncOutcome::Committed(summary) => println!("{}", format_sync_summary(&summary)),
        SyncOutcome::ConflictsPending(conflicts) => {
            println!("{} conflict(s) need a decision", conflicts.len());
            let interactive = prefer.is_none() && stdin_is_interactive();
            settle_conflicts(
                &mut app,
                prefer,
                interactive,
                &mut io::stdin().lock(),
                &mut io::stdout(),
            )?;
        }
    }

    Ok(())
}

/// Drive a pending merge to completion.
///
/// With `prefer` every conflict is resolved the same way. Otherwise the user
/// is asked per conflict when `interactive`; when nobody can answer the merge
/// is abandoned and reported as unresolved.
pub fn settle_conflicts<S, R, I, O>(
    app: &mut QuoteApp<S, R>,
    prefer: Option<Resolution>,
    interactive: bool,
    input: &mut I,
    output: &mut O,
) -> Result<(), CliError>
where
    S: KeyValueStore,
    R: RemoteSource,
    I: BufRead,
    O: Write,
{
    if let Some(choice) = prefer {
        for conflict in app.pending_conflicts() {
            for line in format_conflict_lines(conflict) {
                writeln!(output, "{line}")?;
            }
        }
        let summary = app.resolve_all_conflicts(choice)?;
        writeln!(output, "Kept {choice} version of every conflict")?;
        writeln!(output, "{}", format_sync_summary(&summary))?;
        return Ok(());
    }

    if !interactive {
        let dropped = app.abandon_sync()?;
        return Err(CliError::UnresolvedConflicts(dropped));
    }

    let conflicts = app.pending_conflicts().to_vec();
    for conflict in conflicts {
        let choice = match prompt_resolution(&conflict, input, output) {
            Ok(choice) => choice,
            Err(error) => {
                app.abandon_sync()?;
                return Err(error);
            }
        };

        match app.resolve_conflict(&conflict.id, choice)? {
            ResolveOutcome::Remaining(remaining) => {
                writeln!(output, "Kept {choice} version; {remaining} remaining")?;
            }
            ResolveOutcome::Committed(summary) => {
                writeln!(output, "Kept {choice} version")?;
                writeln!(output, "{}", format_sync_summary(&summary))?;
            }
        }
    }

    Ok(())
}
