//! Sync conflict model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Quote, QuoteId};
use crate::error::Error;

/// Local and server versions of the same quote that disagree on content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Identifier shared by both versions
    pub id: QuoteId,
    /// Version held locally before the sync pass
    pub local: Quote,
    /// Version delivered by the remote source
    pub server: Quote,
}

impl SyncConflict {
    /// Names of the fields that differ between the two versions
    #[must_use]
    pub fn differing_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.local.text != self.server.text {
            fields.push("text");
        }
        if self.local.category != self.server.category {
            fields.push("category");
        }
        fields
    }
}

/// User choice for a single conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Adopt the remote content
    Server,
    /// Keep the pre-sync local content
    Local,
}

impl Resolution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "remote" | "s" => Ok(Self::Server),
            "local" | "l" => Ok(Self::Local),
            other => Err(Error::Validation(format!(
                "unknown resolution '{other}' (expected 'server' or 'local')"
            ))),
        }
    }
}
