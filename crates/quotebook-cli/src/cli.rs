use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use quotebook_core::Resolution;

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Collect, filter and sync quotes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Override the remote endpoint used for sync
    #[arg(long, global = true, value_name = "URL")]
    pub remote_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a random quote from the active filter
    Show,
    /// Add a new quote
    #[command(alias = "new")]
    Add {
        /// Quote text (read from piped stdin when omitted)
        text: Vec<String>,
        /// Category (defaults to "General")
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List quotes matching the active filter
    List {
        /// Ignore the active filter
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List known categories
    Categories,
    /// Show or change the active category filter
    Filter {
        /// Category name, or "all"
        category: Option<String>,
    },
    /// Import quotes from a JSON file
    Import {
        /// Path to a JSON array of {"text", "category"} objects
        path: PathBuf,
    },
    /// Export all quotes as JSON
    Export {
        /// Output path (defaults to quotes-backup.json)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Delete every quote
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Sync with the remote quote source
    Sync {
        /// Resolve every conflict this way instead of prompting
        #[arg(long, value_enum)]
        prefer: Option<ResolutionArg>,
    },
    /// Manage the auto-sync preference
    Autosync {
        #[command(subcommand)]
        command: AutoSyncCommands,
    },
    /// Run auto-sync in the foreground until interrupted
    Watch {
        /// Seconds between sync passes
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Resolve every conflict this way instead of prompting
        #[arg(long, value_enum)]
        prefer: Option<ResolutionArg>,
    },
    /// Configure the CLI
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ResolutionArg {
    Server,
    Local,
}

impl From<ResolutionArg> for Resolution {
    fn from(value: ResolutionArg) -> Self {
        match value {
            ResolutionArg::Server => Self::Server,
            ResolutionArg::Local => Self::Local,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum AutoSyncCommands {
    /// Enable recurring sync
    On,
    /// Disable recurring sync (a running `watch` stops at its next tick)
    Off,
    /// Show auto-sync preference and last sync time
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write CLI config values
    Init {
        /// Remote endpoint returning records with id/title/body
        #[arg(long, value_name = "URL")]
        remote_url: Option<String>,
        /// Seconds between auto-sync passes
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
        /// Maximum remote records taken per sync
        #[arg(long, value_name = "N")]
        remote_limit: Option<usize>,
    },
    /// Print the resolved configuration
    Show,
}
