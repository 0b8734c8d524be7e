pub mod add;
pub mod autosync;
pub mod clear;
pub mod common;
pub mod completions;
pub mod config;
pub mod export;
pub mod filter;
pub mod import;
pub mod list;
pub mod show;
pub mod sync;
pub mod watch;
