use std::path::{Path, PathBuf};

use quotebook_core::export::EXPORT_FILE_NAME;

use crate::commands::common::{open_app, AppContext};
use crate::error::CliError;

pub fn run_export(
    output_path: Option<&Path>,
    to_stdout: bool,
    context: &AppContext,
) -> Result<(), CliError> {
    let app = open_app(context)?;
    let rendered = app.export_quotes()?;

    if to_stdout {
        println!("{rendered}");
        return Ok(());
    }

    let path = output_path.map_or_else(|| PathBuf::from(EXPORT_FILE_NAME), Path::to_path_buf);
    std::fs::write(&path, rendered)?;
    println!("Exported {} quote(s) to {}", app.quotes().len(), path.display());
    Ok(())
}
