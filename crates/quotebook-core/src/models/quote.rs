//! Quote model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CategoryFilter;
use crate::error::{Error, Result};

/// Category assigned when the author leaves it blank
pub const DEFAULT_CATEGORY: &str = "General";

/// Category assigned to every quote mapped from the remote source
pub const SERVER_CATEGORY: &str = "Server";

/// Stable identifier carried by quotes that originate from the remote source.
///
/// Remote ids are namespaced as `server-<n>`. The prefix only separates them
/// from other id schemes; it does not make them unique across remotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(String);

impl QuoteId {
    /// Prefix applied to ids of remote-origin quotes
    pub const SERVER_PREFIX: &'static str = "server-";

    /// Build the synthetic id for a remote record
    #[must_use]
    pub fn server(remote_id: impl fmt::Display) -> Self {
        Self(format!("{}{remote_id}", Self::SERVER_PREFIX))
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id follows the remote namespacing convention
    #[must_use]
    pub fn is_server(&self) -> bool {
        self.0.starts_with(Self::SERVER_PREFIX)
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("quote id cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A quote in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Stable identifier, only present for remote-origin quotes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    /// Quote text, never empty
    pub text: String,
    /// Category label, never empty
    pub category: String,
    /// Last sync-related modification (Unix ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl Quote {
    /// Create a user-authored quote.
    ///
    /// Both fields are trimmed. Blank text is rejected and a blank category
    /// falls back to [`DEFAULT_CATEGORY`].
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("quote text cannot be empty".to_string()));
        }

        Ok(Self {
            id: None,
            text: text.to_string(),
            category: normalize_category(category),
            last_updated: None,
        })
    }

    /// Create a quote mapped from a remote record
    #[must_use]
    pub fn from_server(id: QuoteId, text: impl Into<String>, updated_at: i64) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            category: SERVER_CATEGORY.to_string(),
            last_updated: Some(updated_at),
        }
    }

    /// Check the text/category invariants
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::Validation("quote text cannot be empty".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(Error::Validation(
                "quote category cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// True when text and category are identical (ids and timestamps ignored)
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.text == other.text && self.category == other.category
    }

    /// Return a copy with `last_updated` set to `timestamp_ms`
    #[must_use]
    pub fn touched(mut self, timestamp_ms: i64) -> Self {
        self.last_updated = Some(timestamp_ms);
        self
    }

    /// Whether the quote passes the given category filter
    #[must_use]
    pub fn matches(&self, filter: &CategoryFilter) -> bool {
        filter.matches(&self.category)
    }
}

/// Trim a category, falling back to [`DEFAULT_CATEGORY`] when blank
#[must_use]
pub fn normalize_category(category: &str) -> String {
    let category = category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    }
}

/// Built-in quotes seeded on first launch
#[must_use]
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The only way to do great work is to love what you do.",
            "Inspiration",
        ),
        (
            "Innovation distinguishes between a leader and a follower.",
            "Leadership",
        ),
        (
            "Your time is limited, so don't waste it living someone else's life.",
            "Life",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        id: None,
        text: text.to_string(),
        category: category.to_string(),
        last_updated: None,
    })
    .collect()
}
