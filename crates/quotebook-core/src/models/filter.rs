//! Category filter model

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Active category constraint applied to quote selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    /// No constraint
    #[default]
    All,
    /// Only quotes whose category equals this value
    Category(String),
}

impl CategoryFilter {
    /// Persisted sentinel meaning "no constraint"
    pub const ALL: &'static str = "all";

    /// Parse a user- or storage-supplied value. Blank input means `All`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == Self::ALL {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => Self::ALL,
            Self::Category(category) => category,
        }
    }

    /// Whether a quote with `category` passes this filter
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Category(selected) => selected == category,
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel_and_blank() {
        assert_eq!(CategoryFilter::parse("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(" Life "),
            CategoryFilter::Category("Life".to_string())
        );
    }

    #[test]
    fn test_matches() {
        assert!(CategoryFilter::All.matches("Anything"));
        let life = CategoryFilter::parse("Life");
        assert!(life.matches("Life"));
        assert!(!life.matches("life"));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&CategoryFilter::parse("Life")).unwrap();
        assert_eq!(json, "\"Life\"");
        let parsed: CategoryFilter = serde_json::from_str("\"all\"").unwrap();
        assert!(parsed.is_all());
    }
}
