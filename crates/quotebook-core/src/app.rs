//! Application controller owning every piece of quote state.
//!
//! `QuoteApp` is the single owner of the quote store, the filter, the sync
//! engine and the session cache. Presentation code calls its methods and
//! observes changes through [`QuoteApp::subscribe`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, MutexGuard};

use crate::config::SyncSettings;
use crate::db::{keys, KeyValueStore, MemoryStore};
use crate::error::{Error, Result};
use crate::filter::FilterState;
use crate::models::{CategoryFilter, Quote, QuoteId, Resolution, SyncConflict};
use crate::store::{Confirmation, QuoteStore};
use crate::sync::{last_sync, RemoteSource, ResolveOutcome, SyncEngine, SyncOutcome, SyncSummary};

const EVENT_CAPACITY: usize = 64;

/// State-change notifications for presentation code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    QuotesChanged { count: usize },
    FilterChanged(CategoryFilter),
    SyncStarted,
    SyncCompleted(SyncSummary),
    ConflictsDetected(usize),
    ConflictResolved {
        id: QuoteId,
        choice: Resolution,
        remaining: usize,
    },
    SyncFailed(String),
}

/// Explicit application state
pub struct QuoteApp<S, R> {
    storage: S,
    session: MemoryStore,
    store: QuoteStore,
    filter: FilterState,
    sync: SyncEngine<R>,
    events: broadcast::Sender<AppEvent>,
}

impl<S: KeyValueStore, R: RemoteSource> QuoteApp<S, R> {
    /// Load persisted state and wire the sync engine
    pub fn open(storage: S, source: R, settings: &SyncSettings) -> Result<Self> {
        let store = QuoteStore::load(&storage)?;
        let mut filter = FilterState::load(&storage)?;
        filter.reconcile(&storage, &store.categories())?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            storage,
            session: MemoryStore::new(),
            store,
            filter,
            sync: SyncEngine::new(source, settings.remote_limit),
            events,
        })
    }

    /// Receive future state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub fn quotes(&self) -> &[Quote] {
        self.store.quotes()
    }

    pub const fn store(&self) -> &QuoteStore {
        &self.store
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn filter(&self) -> &CategoryFilter {
        self.filter.get()
    }

    pub fn categories(&self) -> Vec<String> {
        self.store.categories()
    }

    /// Quotes passing the active filter
    pub fn filtered_quotes(&self) -> Vec<&Quote> {
        self.store.matching(self.filter.get()).collect()
    }

    /// Add a quote and switch the filter to its category
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<Quote> {
        self.ensure_no_pending_merge()?;
        let quote = self.store.add(&self.storage, text, category)?;
        self.notify_quotes_changed();
        self.set_filter(CategoryFilter::Category(quote.category.clone()))?;
        Ok(quote)
    }

    /// Import a JSON payload (all-or-nothing)
    pub fn import_quotes(&mut self, raw: &str) -> Result<usize> {
        self.ensure_no_pending_merge()?;
        let count = self.store.import_many(&self.storage, raw)?;
        self.notify_quotes_changed();
        Ok(count)
    }

    /// Indented JSON backup of every quote
    pub fn export_quotes(&self) -> Result<String> {
        self.store.export_all()
    }

    /// Remove every quote; the caller must have confirmed
    pub fn clear_quotes(&mut self, confirmation: Confirmation) -> Result<()> {
        self.ensure_no_pending_merge()?;
        self.store.clear(&self.storage, confirmation)?;
        self.session.remove(keys::LAST_QUOTE)?;
        self.notify_quotes_changed();
        self.reconcile_filter_after_commit();
        Ok(())
    }

    /// Select a category (or `all`). Unknown categories are rejected.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> Result<()> {
        if let CategoryFilter::Category(category) = &filter {
            if !self.store.categories().contains(category) {
                return Err(Error::Validation(format!(
                    "no quotes in category '{category}'"
                )));
            }
        }
        if self.filter.get() == &filter {
            return Ok(());
        }

        self.filter.set(&self.storage, filter.clone())?;
        self.notify(AppEvent::FilterChanged(filter));
        Ok(())
    }

    /// Pick a random quote under the active filter and remember it for the
    /// session
    pub fn show_random_quote(&mut self) -> Result<Option<Quote>> {
        let Some(quote) = self.store.pick_random(self.filter.get()).cloned() else {
            return Ok(None);
        };
        self.session.set_json(keys::LAST_QUOTE, &quote)?;
        Ok(Some(quote))
    }

    /// The quote shown last in this session, if it is still present and
    /// passes the filter; otherwise a fresh random pick
    pub fn current_quote(&mut self) -> Result<Option<Quote>> {
        let remembered = self
            .session
            .get_json::<Quote>(keys::LAST_QUOTE)
            .ok()
            .flatten()
            .filter(|quote| {
                quote.matches(self.filter.get()) && self.store.quotes().contains(quote)
            });

        match remembered {
            Some(quote) => Ok(Some(quote)),
            None => self.show_random_quote(),
        }
    }

    /// Message shown when the active filter matches nothing
    pub fn empty_message(&self) -> String {
        match self.filter.get() {
            CategoryFilter::All => "No quotes available. Add some quotes!".to_string(),
            CategoryFilter::Category(category) => format!(
                "No quotes in \"{category}\" category. Add some or change filter."
            ),
        }
    }

    /// Run one merge pass against the remote source
    pub async fn sync(&mut self) -> Result<SyncOutcome> {
        self.notify(AppEvent::SyncStarted);

        let result = self.sync.sync_pass(&self.storage, &mut self.store).await;
        match &result {
            Ok(SyncOutcome::Committed(summary)) => {
                self.notify_quotes_changed();
                self.notify(AppEvent::SyncCompleted(*summary));
                self.reconcile_filter_after_commit();
            }
            Ok(SyncOutcome::ConflictsPending(conflicts)) => {
                self.notify(AppEvent::ConflictsDetected(conflicts.len()));
            }
            Err(error) => self.notify(AppEvent::SyncFailed(error.to_string())),
        }
        result
    }

    pub fn pending_conflicts(&self) -> &[SyncConflict] {
        self.sync.pending_conflicts()
    }

    /// Whether a merge is held back, including one whose conflicts are all
    /// resolved but whose commit failed
    pub const fn has_pending_merge(&self) -> bool {
        self.sync.has_pending()
    }

    /// Resolve one conflict of the pending merge
    pub fn resolve_conflict(&mut self, id: &QuoteId, choice: Resolution) -> Result<ResolveOutcome> {
        let outcome = self
            .sync
            .resolve(&self.storage, &mut self.store, id, choice)?;

        let remaining = match outcome {
            ResolveOutcome::Remaining(remaining) => remaining,
            ResolveOutcome::Committed(_) => 0,
        };
        self.notify(AppEvent::ConflictResolved {
            id: id.clone(),
            choice,
            remaining,
        });
        if let ResolveOutcome::Committed(summary) = outcome {
            self.finish_resolution(summary);
        }
        Ok(outcome)
    }

    /// Resolve every pending conflict the same way
    pub fn resolve_all_conflicts(&mut self, choice: Resolution) -> Result<SyncSummary> {
        let summary = self
            .sync
            .resolve_all(&self.storage, &mut self.store, choice)?;
        self.finish_resolution(summary);
        Ok(summary)
    }

    /// Drop the pending merge, keeping the store as it was before the pass
    pub fn abandon_sync(&mut self) -> Result<usize> {
        self.sync.abandon_pending()
    }

    /// Timestamp of the last committed sync
    pub fn last_sync(&self) -> Result<Option<i64>> {
        last_sync(&self.storage)
    }

    pub fn auto_sync_enabled(&self) -> Result<bool> {
        Ok(self
            .storage
            .get_json::<bool>(keys::AUTO_SYNC_ENABLED)?
            .unwrap_or(false))
    }

    pub fn set_auto_sync_enabled(&mut self, enabled: bool) -> Result<()> {
        self.storage.set_json(keys::AUTO_SYNC_ENABLED, &enabled)?;
        tracing::info!(
            "Auto-sync {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    fn finish_resolution(&mut self, summary: SyncSummary) {
        self.notify_quotes_changed();
        self.notify(AppEvent::SyncCompleted(summary));
        self.reconcile_filter_after_commit();
    }

    fn ensure_no_pending_merge(&self) -> Result<()> {
        if self.sync.has_pending() {
            return Err(Error::ConflictPending(self.sync.pending_conflicts().len()));
        }
        Ok(())
    }

    /// Reset a stale filter once the quote set has been committed. The commit
    /// already happened, so a failed filter write is logged, not returned.
    fn reconcile_filter_after_commit(&mut self) {
        match self.filter.reconcile(&self.storage, &self.store.categories()) {
            Ok(true) => self.notify(AppEvent::FilterChanged(CategoryFilter::All)),
            Ok(false) => {}
            Err(error) => tracing::warn!("Could not reset stale filter: {error}"),
        }
    }

    fn notify_quotes_changed(&self) {
        self.notify(AppEvent::QuotesChanged {
            count: self.store.len(),
        });
    }

    fn notify(&self, event: AppEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Shared handle used when a manual trigger and the auto-sync loop run side by
/// side. A second sync requested while one is running is rejected.
pub struct SharedApp<S, R> {
    inner: Arc<Mutex<QuoteApp<S, R>>>,
    sync_running: Arc<AtomicBool>,
}

impl<S, R> Clone for SharedApp<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sync_running: Arc::clone(&self.sync_running),
        }
    }
}

impl<S: KeyValueStore, R: RemoteSource> SharedApp<S, R> {
    pub fn new(app: QuoteApp<S, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(app)),
            sync_running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Exclusive access for non-sync operations
    pub async fn lock(&self) -> MutexGuard<'_, QuoteApp<S, R>> {
        self.inner.lock().await
    }

    /// Run a sync pass unless one is already in flight
    pub async fn try_sync(&self) -> Result<SyncOutcome> {
        if self.sync_running.swap(true, Ordering::AcqRel) {
            tracing::warn!("Sync requested while another pass is running; ignoring");
            return Err(Error::SyncInProgress);
        }
        let _running = RunningFlag(&self.sync_running);

        let mut app = self.inner.lock().await;
        app.sync().await
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_running.load(Ordering::Acquire)
    }
}

/// Clears the in-flight flag when the pass finishes or is dropped
struct RunningFlag<'a>(&'a AtomicBool);

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
