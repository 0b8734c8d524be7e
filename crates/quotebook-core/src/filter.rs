//! Active category filter, persisted independently of the quotes.

use std::collections::HashSet;

use crate::db::{keys, KeyValueStore};
use crate::error::Result;
use crate::models::{CategoryFilter, Quote};

/// Tracks the active category filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    active: CategoryFilter,
}

impl FilterState {
    /// Read the persisted filter, defaulting to `all`
    pub fn load(kv: &impl KeyValueStore) -> Result<Self> {
        let active = match kv.get_json::<CategoryFilter>(keys::FILTER) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                tracing::warn!("Stored quote filter unreadable ({error}); using all");
                CategoryFilter::All
            }
        };
        Ok(Self { active })
    }

    /// Active filter
    pub const fn get(&self) -> &CategoryFilter {
        &self.active
    }

    /// Update the active filter and persist it immediately
    pub fn set(&mut self, kv: &impl KeyValueStore, filter: CategoryFilter) -> Result<()> {
        kv.set_json(keys::FILTER, &filter)?;
        tracing::debug!("Quote filter set to '{filter}'");
        self.active = filter;
        Ok(())
    }

    /// Reset a filter naming a category that no longer exists.
    ///
    /// Returns `true` when the filter changed.
    pub fn reconcile(&mut self, kv: &impl KeyValueStore, categories: &[String]) -> Result<bool> {
        match &self.active {
            CategoryFilter::Category(category) if !categories.contains(category) => {
                tracing::info!("Category '{category}' no longer exists; showing all quotes");
                self.set(kv, CategoryFilter::All)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Distinct categories of `quotes`, keeping first-seen order
pub fn categories_of(quotes: &[Quote]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    for quote in quotes {
        if seen.insert(quote.category.as_str()) {
            categories.push(quote.category.clone());
        }
    }
    categories
}
