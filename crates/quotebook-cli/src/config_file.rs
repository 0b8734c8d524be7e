//! Persistent CLI configuration.
//!
//! Values resolve in order: command-line flag, environment variable, config
//! file, built-in default.

use std::path::{Path, PathBuf};

use quotebook_core::config::SyncSettings;
use quotebook_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "quotebook";
const DB_FILE_NAME: &str = "quotebook.db";

pub const REMOTE_URL_ENV: &str = "QUOTEBOOK_REMOTE_URL";
pub const SYNC_INTERVAL_ENV: &str = "QUOTEBOOK_SYNC_INTERVAL_SECS";
pub const DB_PATH_ENV: &str = "QUOTEBOOK_DB_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Environment values that take part in resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub remote_url: Option<String>,
    pub sync_interval_secs: Option<String>,
    pub db_path: Option<PathBuf>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            remote_url: std::env::var(REMOTE_URL_ENV).ok(),
            sync_interval_secs: std::env::var(SYNC_INTERVAL_ENV).ok(),
            db_path: std::env::var_os(DB_PATH_ENV).map(PathBuf::from),
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("failed to resolve config directory".to_string()))
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(DB_FILE_NAME))
        .ok_or_else(|| CliError::Config("failed to resolve data directory".to_string()))
}

impl CliConfig {
    pub fn load() -> Result<Self, CliError> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|error| {
            CliError::Config(format!(
                "failed to read config at {}: {error}",
                path.display()
            ))
        })?;
        let mut config = serde_json::from_str::<Self>(&raw).map_err(|error| {
            CliError::Config(format!(
                "failed to parse config at {}: {error}",
                path.display()
            ))
        })?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, CliError> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), CliError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn normalize(&mut self) {
        self.version = default_config_version();
        self.remote_url = normalize_text_option(self.remote_url.take());
    }

    /// Layer flag, environment and file values over the defaults and validate
    /// the result.
    pub fn resolve_sync_settings(
        &self,
        env: &EnvOverrides,
        flag_remote_url: Option<String>,
    ) -> Result<SyncSettings, CliError> {
        let mut settings = SyncSettings::default();

        if let Some(url) = normalize_text_option(flag_remote_url)
            .or_else(|| normalize_text_option(env.remote_url.clone()))
            .or_else(|| self.remote_url.clone())
        {
            settings.remote_url = url;
        }

        if let Some(raw) = normalize_text_option(env.sync_interval_secs.clone()) {
            settings.interval_secs = raw.parse().map_err(|_| {
                CliError::Config(format!(
                    "{SYNC_INTERVAL_ENV} must be a whole number of seconds, got '{raw}'"
                ))
            })?;
        } else if let Some(secs) = self.sync_interval_secs {
            settings.interval_secs = secs;
        }

        if let Some(limit) = self.remote_limit {
            settings.remote_limit = limit;
        }

        Ok(settings.validated()?)
    }

    pub fn resolve_db_path(
        &self,
        env: &EnvOverrides,
        flag_db_path: Option<PathBuf>,
    ) -> Result<PathBuf, CliError> {
        match flag_db_path
            .or_else(|| env.db_path.clone())
            .or_else(|| self.db_path.clone())
        {
            Some(path) => Ok(path),
            None => default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quotebook_core::config::{DEFAULT_REMOTE_LIMIT, DEFAULT_REMOTE_URL};

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_path(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = CliConfig {
            version: 0,
            remote_url: Some("  https://quotes.example.com/api  ".to_string()),
            sync_interval_secs: Some(30),
            remote_limit: Some(5),
            db_path: None,
        };

        config.save_to_path(&path).unwrap();
        let loaded = CliConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded.version, 1);
        assert_eq!(
            loaded.remote_url.as_deref(),
            Some("https://quotes.example.com/api")
        );
        assert_eq!(loaded.sync_interval_secs, Some(30));
        assert_eq!(loaded.remote_limit, Some(5));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = CliConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(error, CliError::Config(_)));
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let settings = CliConfig::default()
            .resolve_sync_settings(&EnvOverrides::default(), None)
            .unwrap();
        assert_eq!(settings.remote_url, DEFAULT_REMOTE_URL);
        assert_eq!(settings.remote_limit, DEFAULT_REMOTE_LIMIT);
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let config = CliConfig {
            remote_url: Some("https://file.example.com".to_string()),
            sync_interval_secs: Some(120),
            ..CliConfig::default()
        };
        let env = EnvOverrides {
            remote_url: Some("https://env.example.com".to_string()),
            sync_interval_secs: Some("15".to_string()),
            db_path: None,
        };

        let from_env = config.resolve_sync_settings(&env, None).unwrap();
        assert_eq!(from_env.remote_url, "https://env.example.com");
        assert_eq!(from_env.interval_secs, 15);

        let from_flag = config
            .resolve_sync_settings(&env, Some("https://flag.example.com".to_string()))
            .unwrap();
        assert_eq!(from_flag.remote_url, "https://flag.example.com");

        let from_file = config
            .resolve_sync_settings(&EnvOverrides::default(), None)
            .unwrap();
        assert_eq!(from_file.remote_url, "https://file.example.com");
        assert_eq!(from_file.interval_secs, 120);
    }

    #[test]
    fn rejects_bad_interval_and_url() {
        let env = EnvOverrides {
            sync_interval_secs: Some("soon".to_string()),
            ..EnvOverrides::default()
        };
        assert!(matches!(
            CliConfig::default().resolve_sync_settings(&env, None),
            Err(CliError::Config(_))
        ));

        assert!(matches!(
            CliConfig::default()
                .resolve_sync_settings(&EnvOverrides::default(), Some("ftp://x".to_string())),
            Err(CliError::Core(quotebook_core::Error::Config(_)))
        ));
    }

    #[test]
    fn db_path_prefers_flag_then_env_then_file() {
        let config = CliConfig {
            db_path: Some(PathBuf::from("/file/quotes.db")),
            ..CliConfig::default()
        };
        let env = EnvOverrides {
            db_path: Some(PathBuf::from("/env/quotes.db")),
            ..EnvOverrides::default()
        };

        assert_eq!(
            config
                .resolve_db_path(&env, Some(PathBuf::from("/flag/quotes.db")))
                .unwrap(),
            PathBuf::from("/flag/quotes.db")
        );
        assert_eq!(
            config.resolve_db_path(&env, None).unwrap(),
            PathBuf::from("/env/quotes.db")
        );
        assert_eq!(
            config
                .resolve_db_path(&EnvOverrides::default(), None)
                .unwrap(),
            PathBuf::from("/file/quotes.db")
        );
    }
}
