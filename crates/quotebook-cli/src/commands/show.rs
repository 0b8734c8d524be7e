use crate::commands::common::{format_quote, open_app, AppContext};
use crate::error::CliError;

pub fn run_show(context: &AppContext) -> Result<(), CliError> {
    let mut app = open_app(context)?;

    match app.show_random_quote()? {
        Some(quote) => println!("{}", format_quote(&quote)),
        None => println!("{}", app.empty_message()),
    }

    Ok(())
}
