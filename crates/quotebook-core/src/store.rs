//! Ordered quote collection backed by the persisted `quotes` snapshot.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::{keys, KeyValueStore};
use crate::error::{Error, Result};
use crate::export::{parse_import, render_json_export};
use crate::filter::categories_of;
use crate::models::{default_quotes, CategoryFilter, Quote};

/// Token proving the caller confirmed a destructive operation.
///
/// The core never prompts; the presentation layer builds this after the user
/// agreed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation(());

impl Confirmation {
    #[must_use]
    pub const fn confirmed() -> Self {
        Self(())
    }
}

/// In-memory quote sequence. Every mutation rewrites the persisted snapshot
/// before the in-memory state changes, so a failed write leaves both intact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Restore quotes from storage, seeding the defaults when nothing is
    /// stored or the stored snapshot is unreadable.
    pub fn load(kv: &impl KeyValueStore) -> Result<Self> {
        let Some(raw) = kv.get(keys::QUOTES)? else {
            tracing::info!("No stored quotes found, seeding defaults");
            return Self::seed(kv);
        };

        match decode_snapshot(&raw) {
            Ok(quotes) => {
                tracing::debug!("Loaded {} quotes from storage", quotes.len());
                Ok(Self { quotes })
            }
            Err(error) => {
                tracing::warn!("{error}; restoring default quotes");
                Self::seed(kv)
            }
        }
    }

    fn seed(kv: &impl KeyValueStore) -> Result<Self> {
        let quotes = default_quotes();
        kv.set(keys::QUOTES, &serde_json::to_string(&quotes)?)?;
        Ok(Self { quotes })
    }

    /// Create a store from already-validated quotes without touching storage
    #[must_use]
    pub const fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<String> {
        categories_of(&self.quotes)
    }

    /// Quotes passing `filter`, in store order
    pub fn matching<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a Quote> {
        self.quotes.iter().filter(move |quote| quote.matches(filter))
    }

    /// Append a user-authored quote
    pub fn add(&mut self, kv: &impl KeyValueStore, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new(text, category)?;

        let mut next = self.quotes.clone();
        next.push(quote.clone());
        self.commit(kv, next, &[])?;

        tracing::debug!("Added quote in category '{}'", quote.category);
        Ok(quote)
    }

    /// Append every quote in a JSON import payload, or none of them
    pub fn import_many(&mut self, kv: &impl KeyValueStore, raw: &str) -> Result<usize> {
        let imported = parse_import(raw)?;
        let count = imported.len();

        let mut next = self.quotes.clone();
        next.extend(imported);
        self.commit(kv, next, &[])?;

        tracing::info!("Imported {count} quotes");
        Ok(count)
    }

    /// Serialize the whole collection as indented JSON
    pub fn export_all(&self) -> Result<String> {
        render_json_export(&self.quotes)
    }

    /// Remove every quote and the persisted snapshot
    pub fn clear(&mut self, kv: &impl KeyValueStore, _confirmation: Confirmation) -> Result<()> {
        kv.remove(keys::QUOTES)?;
        let removed = self.quotes.len();
        self.quotes.clear();
        tracing::info!("Cleared {removed} quotes");
        Ok(())
    }

    /// Uniformly random quote passing `filter`
    pub fn pick_random(&self, filter: &CategoryFilter) -> Option<&Quote> {
        self.pick_random_by(&mut rand::thread_rng(), |quote| quote.matches(filter))
    }

    /// Uniformly random quote satisfying `predicate`, drawn from `rng`
    pub fn pick_random_by<R, P>(&self, rng: &mut R, predicate: P) -> Option<&Quote>
    where
        R: Rng + ?Sized,
        P: Fn(&Quote) -> bool,
    {
        let candidates = self
            .quotes
            .iter()
            .filter(|quote| predicate(quote))
            .collect::<Vec<_>>();
        candidates.choose(rng).copied()
    }

    /// Replace the whole sequence, writing `extra` entries in the same
    /// atomic batch as the snapshot
    pub fn replace_all(
        &mut self,
        kv: &impl KeyValueStore,
        quotes: Vec<Quote>,
        extra: &[(&str, String)],
    ) -> Result<()> {
        self.commit(kv, quotes, extra)
    }

    fn commit(
        &mut self,
        kv: &impl KeyValueStore,
        quotes: Vec<Quote>,
        extra: &[(&str, String)],
    ) -> Result<()> {
        let mut entries = Vec::with_capacity(extra.len() + 1);
        entries.push((keys::QUOTES, serde_json::to_string(&quotes)?));
        entries.extend(extra.iter().cloned());
        kv.set_many(&entries)?;

        self.quotes = quotes;
        Ok(())
    }
}

fn decode_snapshot(raw: &str) -> Result<Vec<Quote>> {
    let quotes: Vec<Quote> = serde_json::from_str(raw)
        .map_err(|error| Error::StorageCorruption(format!("stored quotes unreadable: {error}")))?;

    if let Some(position) = quotes.iter().position(|quote| quote.validate().is_err()) {
        return Err(Error::StorageCorruption(format!(
            "stored quote {} has empty text or category",
            position + 1
        )));
    }

    Ok(quotes)
}
