//! quotebook-core - Core library for Quotebook
//!
//! This crate contains the shared models, storage layer, quote store, filter
//! state and sync engine used by all Quotebook interfaces.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod store;
pub mod sync;
pub mod util;

pub use app::{AppEvent, QuoteApp, SharedApp};
pub use error::{Error, Result};
pub use models::{CategoryFilter, Quote, QuoteId, Resolution, SyncConflict};
pub use store::{Confirmation, QuoteStore};
