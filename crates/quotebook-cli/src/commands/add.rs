use crate::commands::common::{open_app, resolve_quote_text, AppContext};
use crate::error::CliError;

pub fn run_add(
    text_parts: &[String],
    category: Option<&str>,
    context: &AppContext,
) -> Result<(), CliError> {
    let text = resolve_quote_text(text_parts)?;
    let mut app = open_app(context)?;
    let quote = app.add_quote(&text, category.unwrap_or_default())?;

    println!(
        "Added quote to \"{}\" ({} total). Filter set to \"{}\".",
        quote.category,
        app.quotes().len(),
        app.filter()
    );
    Ok(())
}
