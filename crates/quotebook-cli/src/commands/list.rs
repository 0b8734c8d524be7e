use quotebook_core::Quote;

use crate::commands::common::{
    format_quote_lines, open_app, quote_to_list_item, AppContext, QuoteListItem,
};
use crate::error::CliError;

pub fn run_list(ignore_filter: bool, as_json: bool, context: &AppContext) -> Result<(), CliError> {
    let app = open_app(context)?;
    let quotes: Vec<&Quote> = if ignore_filter {
        app.quotes().iter().collect()
    } else {
        app.filtered_quotes()
    };

    if as_json {
        let json_items = quotes
            .iter()
            .map(|quote| quote_to_list_item(quote))
            .collect::<Vec<QuoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if quotes.is_empty() {
        println!("{}", app.empty_message());
    } else {
        for line in format_quote_lines(&quotes) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn run_categories(context: &AppContext) -> Result<(), CliError> {
    let app = open_app(context)?;
    let active = app.filter();

    let marker = if active.is_all() { "*" } else { " " };
    println!("{marker} all");
    for category in app.categories() {
        let marker = if active.matches(&category) && !active.is_all() {
            "*"
        } else {
            " "
        };
        println!("{marker} {category}");
    }

    Ok(())
}
