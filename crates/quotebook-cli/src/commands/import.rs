use std::path::Path;

use crate::commands::common::{open_app, AppContext};
use crate::error::CliError;

pub fn run_import(path: &Path, context: &AppContext) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(path)?;
    let mut app = open_app(context)?;
    let imported = app.import_quotes(&raw)?;

    println!(
        "Imported {imported} quote(s) from {} ({} total)",
        path.display(),
        app.quotes().len()
    );
    Ok(())
}
