//! JSON backup export and import parsing.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{normalize_category, Quote, QuoteId};

/// File name offered for JSON backups
pub const EXPORT_FILE_NAME: &str = "quotes-backup.json";

/// Render quotes as indented JSON.
///
/// An empty collection is rejected so that a backup always contains data.
pub fn render_json_export(quotes: &[Quote]) -> Result<String> {
    if quotes.is_empty() {
        return Err(Error::EmptyStore);
    }
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Parse an import payload into quotes.
///
/// The payload must be a JSON array of objects. Every element needs a
/// non-empty string `text`; `category` is optional and must be a string when
/// present. `id` and `lastUpdated` are carried over so exported backups
/// import unchanged. The first invalid element fails the whole payload.
pub fn parse_import(raw: &str) -> Result<Vec<Quote>> {
    let payload: Value = serde_json::from_str(raw)
        .map_err(|error| Error::ImportFormat(format!("file is not valid JSON: {error}")))?;

    let Value::Array(items) = payload else {
        return Err(Error::ImportFormat(
            "expected a JSON array of quote objects".to_string(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_import_item(index, item))
        .collect()
}

fn parse_import_item(index: usize, item: &Value) -> Result<Quote> {
    let position = index + 1;
    let Value::Object(fields) = item else {
        return Err(Error::ImportFormat(format!(
            "item {position} is not an object"
        )));
    };

    let text = fields
        .get("text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            Error::ImportFormat(format!(
                "item {position} is missing a non-empty string \"text\""
            ))
        })?;

    let category = match fields.get("category") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(category)) => category.clone(),
        Some(_) => {
            return Err(Error::ImportFormat(format!(
                "item {position} has a non-string \"category\""
            )))
        }
    };

    let id = match fields.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.parse::<QuoteId>().map_err(|_| {
            Error::ImportFormat(format!("item {position} has an empty \"id\""))
        })?),
        Some(_) => {
            return Err(Error::ImportFormat(format!(
                "item {position} has a non-string \"id\""
            )))
        }
    };

    let last_updated = match fields.get("lastUpdated") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_i64().ok_or_else(|| {
            Error::ImportFormat(format!(
                "item {position} has a non-integer \"lastUpdated\""
            ))
        })?),
    };

    Ok(Quote {
        id,
        text: text.to_string(),
        category: normalize_category(&category),
        last_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_CATEGORY;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_json_export_rejects_empty() {
        assert!(matches!(render_json_export(&[]), Err(Error::EmptyStore)));
    }

    #[test]
    fn render_json_export_is_indented() {
        let quotes = vec![Quote::new("Hello", "Life").unwrap()];
        let rendered = render_json_export(&quotes).unwrap();
        assert!(rendered.contains("\n  {"));
        assert!(rendered.contains("\"text\": \"Hello\""));
    }

    #[test]
    fn parse_import_defaults_category() {
        let quotes = parse_import(r#"[{"text": "A"}, {"text": "B", "category": "  "}]"#).unwrap();
        assert_eq!(quotes.len(), 2);
        assert!(quotes.iter().all(|quote| quote.category == DEFAULT_CATEGORY));
    }

    #[test]
    fn parse_import_rejects_non_array() {
        let error = parse_import(r#"{"text": "A"}"#).unwrap_err();
        assert!(matches!(error, Error::ImportFormat(_)));
        assert!(error.to_string().contains("array"));
    }

    #[test]
    fn parse_import_rejects_invalid_json() {
        assert!(matches!(
            parse_import("[{"),
            Err(Error::ImportFormat(_))
        ));
    }

    #[test]
    fn parse_import_names_offending_item() {
        let error =
            parse_import(r#"[{"text": "ok"}, {"category": "Life"}]"#).unwrap_err();
        assert!(error.to_string().contains("item 2"));

        let error = parse_import(r#"[{"text": 5}]"#).unwrap_err();
        assert!(error.to_string().contains("item 1"));

        let error = parse_import(r#"[{"text": "ok", "category": 3}]"#).unwrap_err();
        assert!(error.to_string().contains("category"));
    }

    #[test]
    fn export_then_parse_reproduces_quotes() {
        let quotes = vec![
            Quote::new("Local", "Life").unwrap(),
            Quote::from_server(QuoteId::server(3), "Remote", 1_700_000_000_000),
        ];

        let rendered = render_json_export(&quotes).unwrap();
        assert_eq!(parse_import(&rendered).unwrap(), quotes);
    }
}
