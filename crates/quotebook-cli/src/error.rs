use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] quotebook_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Refusing to clear quotes without confirmation; pass --yes")]
    ConfirmationRequired,
    #[error("Cancelled")]
    Cancelled,
    #[error(
        "{0} sync conflict(s) left unresolved. Run `quotebook sync` in a terminal or pass --prefer server|local."
    )]
    UnresolvedConflicts(usize),
    #[error("Auto-sync is disabled. Run `quotebook autosync on` first.")]
    AutoSyncDisabled,
    #[error("Configuration error: {0}")]
    Config(String),
}
