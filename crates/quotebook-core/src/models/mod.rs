//! Data models for Quotebook

mod filter;
mod quote;
mod sync_conflict;

pub use filter::CategoryFilter;
pub use quote::{
    default_quotes, normalize_category, Quote, QuoteId, DEFAULT_CATEGORY, SERVER_CATEGORY,
};
pub use sync_conflict::{Resolution, SyncConflict};
