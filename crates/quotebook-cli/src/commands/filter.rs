use quotebook_core::CategoryFilter;

use crate::commands::common::{format_quote, open_app, AppContext};
use crate::error::CliError;

/// Print the active filter, or select a new one and show a quote from it.
pub fn run_filter(category: Option<&str>, context: &AppContext) -> Result<(), CliError> {
    let mut app = open_app(context)?;

    let Some(category) = category else {
        println!("{}", app.filter());
        return Ok(());
    };

    app.set_filter(CategoryFilter::parse(category))?;
    println!("Filter set to \"{}\"", app.filter());

    match app.show_random_quote()? {
        Some(quote) => println!("{}", format_quote(&quote)),
        None => println!("{}", app.empty_message()),
    }
    Ok(())
}
