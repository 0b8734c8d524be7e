//! Remote quote source and record mapping.

use std::collections::HashSet;

use reqwest::StatusCode;
use serde_json::Value;

use crate::config::normalize_required_http_url;
use crate::error::{Error, Result};
use crate::models::{Quote, QuoteId};

/// Source of raw remote records
#[allow(async_fn_in_trait)]
pub trait RemoteSource {
    /// Fetch every record the remote currently offers.
    ///
    /// Individual records are returned undecoded so that malformed entries can
    /// be dropped without failing the whole pass.
    async fn fetch(&self) -> Result<Vec<Value>>;
}

/// HTTP implementation of `RemoteSource` (single GET, JSON array body)
#[derive(Clone)]
pub struct HttpRemoteSource {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRemoteSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = normalize_required_http_url(endpoint.into(), "remote_url")?;
        Ok(Self {
            endpoint,
            client: reqwest::Client::builder().build()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteSource for HttpRemoteSource {
    async fn fetch(&self) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::SyncTransport(describe_status(status, &body)));
        }

        match response.json::<Value>().await? {
            Value::Array(records) => Ok(records),
            other => Err(Error::SyncTransport(format!(
                "remote returned {} instead of a record array",
                json_kind(&other)
            ))),
        }
    }
}

/// Longest slice of a response body or record echoed into messages
const SNIPPET_CHARS: usize = 180;

fn snippet(text: &str) -> String {
    text.trim().chars().take(SNIPPET_CHARS).collect()
}

fn describe_status(status: StatusCode, body: &str) -> String {
    let trimmed = snippet(body);
    if trimmed.is_empty() {
        format!("remote returned HTTP {}", status.as_u16())
    } else {
        format!("remote returned HTTP {}: {trimmed}", status.as_u16())
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Remote record with the fields a quote needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl RemoteRecord {
    /// Decode a record, returning `None` unless `id`, `title` and `body` are
    /// all present and non-blank.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value.get("id")? {
            Value::Number(number) => number.to_string(),
            Value::String(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => return None,
        };
        let title = non_blank_str(value.get("title")?)?;
        let body = non_blank_str(value.get("body")?)?;

        Some(Self {
            id,
            title: title.to_string(),
            body: body.to_string(),
        })
    }

    /// Convert to a quote in the `Server` category
    pub fn into_quote(self, updated_at: i64) -> Quote {
        Quote::from_server(QuoteId::server(&self.id), self.title, updated_at)
    }
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|text| !text.is_empty())
}

/// Map raw records to quotes.
///
/// Malformed records and repeated ids are skipped; at most `limit` quotes are
/// produced, in remote order.
pub fn map_remote_records(records: &[Value], limit: usize, updated_at: i64) -> Vec<Quote> {
    let mut seen = HashSet::new();
    let mut quotes = Vec::new();

    for value in records {
        if quotes.len() >= limit {
            break;
        }
        let Some(record) = RemoteRecord::from_value(value) else {
            tracing::debug!("Dropping malformed remote record: {}", snippet(&value.to_string()));
            continue;
        };
        if !seen.insert(record.id.clone()) {
            tracing::debug!("Dropping duplicate remote record id {}", record.id);
            continue;
        }
        quotes.push(record.into_quote(updated_at));
    }

    quotes
}
