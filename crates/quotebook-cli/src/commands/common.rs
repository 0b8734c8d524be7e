use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;

use chrono::Utc;
use quotebook_core::config::SyncSettings;
use quotebook_core::db::Database;
use quotebook_core::sync::{HttpRemoteSource, SyncSummary};
use quotebook_core::{Quote, QuoteApp, Resolution, SyncConflict};
use serde::Serialize;

use crate::error::CliError;

pub type CliApp = QuoteApp<Database, HttpRemoteSource>;

/// Resolved locations and settings shared by every command
#[derive(Debug, Clone)]
pub struct AppContext {
    pub db_path: PathBuf,
    pub settings: SyncSettings,
}

pub fn open_app(context: &AppContext) -> Result<CliApp, CliError> {
    let db = Database::open(&context.db_path)?;
    let source = HttpRemoteSource::new(context.settings.remote_url.as_str())?;
    Ok(QuoteApp::open(db, source, &context.settings)?)
}

#[derive(Debug, Serialize)]
pub struct QuoteListItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
}

pub fn quote_to_list_item(quote: &Quote) -> QuoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    QuoteListItem {
        id: quote.id.as_ref().map(ToString::to_string),
        text: quote.text.clone(),
        category: quote.category.clone(),
        last_updated: quote.last_updated,
        relative_time: quote
            .last_updated
            .map(|timestamp| format_relative_time(timestamp, now_ms)),
    }
}

pub fn format_quote(quote: &Quote) -> String {
    format!("\"{}\"\n  ({})", quote.text, quote.category)
}

pub fn format_quote_lines(quotes: &[&Quote]) -> Vec<String> {
    quotes
        .iter()
        .map(|quote| {
            let preview = quote_preview(&quote.text, 60);
            match &quote.id {
                Some(id) => format!("{:<14}  {preview:<60}  {id}", quote.category),
                None => format!("{:<14}  {preview}", quote.category),
            }
        })
        .collect()
}

pub fn quote_preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_sync_summary(summary: &SyncSummary) -> String {
    format!(
        "Synced {} server quote(s); {} quote(s) stored. Last sync: {}",
        summary.remote_count,
        summary.total_count,
        format_sync_timestamp(summary.synced_at)
    )
}

pub fn format_conflict_lines(conflict: &SyncConflict) -> Vec<String> {
    vec![
        format!(
            "Conflict on {} ({} differs)",
            conflict.id,
            conflict.differing_fields().join(", ")
        ),
        format!(
            "  local:  \"{}\" ({})",
            conflict.local.text, conflict.local.category
        ),
        format!(
            "  server: \"{}\" ({})",
            conflict.server.text, conflict.server.category
        ),
    ]
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Quote text from arguments, falling back to piped stdin. Blank input is
/// passed through so the store reports the validation error.
pub fn resolve_quote_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }

    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn stdin_is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Ask a yes/no question; anything but `y`/`yes` (including EOF) is a no.
pub fn confirm<I: BufRead, O: Write>(
    prompt: &str,
    input: &mut I,
    output: &mut O,
) -> Result<bool, CliError> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Show both versions of a conflict and read the user's choice until it is
/// understood. EOF cancels.
pub fn prompt_resolution<I: BufRead, O: Write>(
    conflict: &SyncConflict,
    input: &mut I,
    output: &mut O,
) -> Result<Resolution, CliError> {
    for line in format_conflict_lines(conflict) {
        writeln!(output, "{line}")?;
    }

    loop {
        write!(output, "Keep [s]erver or [l]ocal version? ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Err(CliError::Cancelled);
        }
        match answer.trim().parse::<Resolution>() {
            Ok(choice) => return Ok(choice),
            Err(_) => writeln!(output, "Please answer 's' or 'l'.")?,
        }
    }
}
