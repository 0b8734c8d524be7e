use std::io;

use quotebook_core::Confirmation;

use crate::commands::common::{confirm, open_app, stdin_is_interactive, AppContext};
use crate::error::CliError;

pub fn run_clear(assume_yes: bool, context: &AppContext) -> Result<(), CliError> {
    let mut app = open_app(context)?;
    let count = app.quotes().len();

    if !assume_yes {
        if !stdin_is_interactive() {
            return Err(CliError::ConfirmationRequired);
        }
        let prompt = format!("Clear all {count} quote(s)? This cannot be undone.");
        if !confirm(&prompt, &mut io::stdin().lock(), &mut io::stdout())? {
            return Err(CliError::Cancelled);
        }
    }

    app.clear_quotes(Confirmation::confirmed())?;
    println!("Cleared {count} quote(s)");
    Ok(())
}
