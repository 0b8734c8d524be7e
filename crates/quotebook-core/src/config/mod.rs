//! Sync configuration shared by all clients.
//!
//! Provides `SyncSettings`, the validated description of the remote source
//! and the auto-sync cadence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Placeholder endpoint standing in for a real quote service
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";
/// Auto-sync cadence when none is configured
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;
/// Number of remote records taken per sync pass
pub const DEFAULT_REMOTE_LIMIT: usize = 10;

/// Remote source and scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncSettings {
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_remote_limit")]
    pub remote_limit: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            remote_limit: DEFAULT_REMOTE_LIMIT,
        }
    }
}

impl SyncSettings {
    /// Auto-sync interval as a `Duration`
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Normalize and check every field.
    pub fn validated(self) -> Result<Self> {
        if self.interval_secs == 0 {
            return Err(Error::Config(
                "sync interval must be at least 1 second".to_string(),
            ));
        }
        if self.remote_limit == 0 {
            return Err(Error::Config(
                "remote record limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            remote_url: normalize_required_http_url(self.remote_url, "remote_url")?,
            ..self
        })
    }
}

fn default_remote_url() -> String {
    DEFAULT_REMOTE_URL.to_string()
}

const fn default_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

const fn default_remote_limit() -> usize {
    DEFAULT_REMOTE_LIMIT
}

/// Trim `raw` and require an `http://` or `https://` scheme.
pub fn normalize_required_http_url(raw: String, field: &str) -> Result<String> {
    let value = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config(format!("field '{field}' is required")))?;
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(format!(
            "field '{field}' must include http:// or https://"
        )))
    }
}
