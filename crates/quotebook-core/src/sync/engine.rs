//! Sync pass execution and conflict resolution.

use crate::db::{keys, KeyValueStore};
use crate::error::{Error, Result};
use crate::models::{Quote, QuoteId, Resolution, SyncConflict};
use crate::store::QuoteStore;
use crate::util::unix_millis_now;

use super::merge::plan_merge;
use super::remote::{map_remote_records, RemoteSource};

/// Summary of a committed merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Usable quotes delivered by the remote
    pub remote_count: usize,
    /// Store size after the commit
    pub total_count: usize,
    /// Recorded `lastSync` value (Unix ms)
    pub synced_at: i64,
}

/// Result of a sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Merge committed and persisted
    Committed(SyncSummary),
    /// Merge suspended until every conflict is resolved
    ConflictsPending(Vec<SyncConflict>),
}

/// Result of resolving one conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// More conflicts remain; nothing committed yet
    Remaining(usize),
    /// That was the last conflict; the merge is committed
    Committed(SyncSummary),
}

/// Merge candidate waiting on user choices
#[derive(Debug, Clone)]
struct PendingMerge {
    merged: Vec<Quote>,
    conflicts: Vec<SyncConflict>,
    remote_count: usize,
}

/// Reconciles the quote store with a remote source
pub struct SyncEngine<R> {
    source: R,
    remote_limit: usize,
    pending: Option<PendingMerge>,
}

impl<R: RemoteSource> SyncEngine<R> {
    pub const fn new(source: R, remote_limit: usize) -> Self {
        Self {
            source,
            remote_limit,
            pending: None,
        }
    }

    pub const fn source(&self) -> &R {
        &self.source
    }

    /// Run one merge pass.
    ///
    /// Fails with `ConflictPending` while an earlier pass awaits resolution.
    /// A transport failure leaves the store and `lastSync` untouched.
    pub async fn sync_pass(
        &mut self,
        kv: &impl KeyValueStore,
        store: &mut QuoteStore,
    ) -> Result<SyncOutcome> {
        if let Some(pending) = &self.pending {
            return Err(Error::ConflictPending(pending.conflicts.len()));
        }

        let local = store.quotes().to_vec();
        let records = self.source.fetch().await.inspect_err(|error| {
            tracing::warn!("Sync aborted: {error}");
        })?;

        let remote = map_remote_records(&records, self.remote_limit, unix_millis_now());
        let remote_count = remote.len();
        tracing::debug!(
            "Fetched {} remote records, {remote_count} usable",
            records.len()
        );

        let plan = plan_merge(&local, remote);
        if plan.is_clean() {
            let summary = commit(kv, store, plan.merged, remote_count)?;
            return Ok(SyncOutcome::Committed(summary));
        }

        tracing::info!(
            "Sync found {} conflict(s); waiting for resolution",
            plan.conflicts.len()
        );
        let conflicts = plan.conflicts.clone();
        self.pending = Some(PendingMerge {
            merged: plan.merged,
            conflicts: plan.conflicts,
            remote_count,
        });
        Ok(SyncOutcome::ConflictsPending(conflicts))
    }

    /// Conflicts still awaiting a choice
    pub fn pending_conflicts(&self) -> &[SyncConflict] {
        match &self.pending {
            Some(pending) => &pending.conflicts,
            None => &[],
        }
    }

    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply `choice` to the conflict for `id`; commits once none remain.
    pub fn resolve(
        &mut self,
        kv: &impl KeyValueStore,
        store: &mut QuoteStore,
        id: &QuoteId,
        choice: Resolution,
    ) -> Result<ResolveOutcome> {
        let pending = self.pending.as_mut().ok_or(Error::NoPendingMerge)?;
        let position = pending
            .conflicts
            .iter()
            .position(|conflict| &conflict.id == id)
            .ok_or_else(|| Error::ConflictNotFound(id.to_string()))?;

        let conflict = pending.conflicts.remove(position);
        let chosen = match choice {
            Resolution::Server => conflict.server,
            Resolution::Local => conflict.local.touched(unix_millis_now()),
        };
        if let Some(slot) = pending
            .merged
            .iter_mut()
            .find(|quote| quote.id.as_ref() == Some(id))
        {
            *slot = chosen;
        }
        tracing::debug!("Resolved conflict {id} with {choice}");

        if !pending.conflicts.is_empty() {
            return Ok(ResolveOutcome::Remaining(pending.conflicts.len()));
        }

        self.commit_pending(kv, store).map(ResolveOutcome::Committed)
    }

    /// Apply the same choice to every outstanding conflict and commit.
    ///
    /// A pending merge with no conflicts left (its final commit failed) is
    /// committed again, so this is also the retry path.
    pub fn resolve_all(
        &mut self,
        kv: &impl KeyValueStore,
        store: &mut QuoteStore,
        choice: Resolution,
    ) -> Result<SyncSummary> {
        let ids = self
            .pending
            .as_ref()
            .ok_or(Error::NoPendingMerge)?
            .conflicts
            .iter()
            .map(|conflict| conflict.id.clone())
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return self.commit_pending(kv, store);
        }

        let mut summary = None;
        for id in &ids {
            if let ResolveOutcome::Committed(committed) = self.resolve(kv, store, id, choice)? {
                summary = Some(committed);
            }
        }
        summary.ok_or(Error::NoPendingMerge)
    }

    /// Drop the pending merge without touching the store
    pub fn abandon_pending(&mut self) -> Result<usize> {
        let pending = self.pending.take().ok_or(Error::NoPendingMerge)?;
        tracing::info!(
            "Abandoned sync with {} unresolved conflict(s)",
            pending.conflicts.len()
        );
        Ok(pending.conflicts.len())
    }

    fn commit_pending(
        &mut self,
        kv: &impl KeyValueStore,
        store: &mut QuoteStore,
    ) -> Result<SyncSummary> {
        let pending = self.pending.take().ok_or(Error::NoPendingMerge)?;
        let remote_count = pending.remote_count;
        match commit(kv, store, pending.merged.clone(), remote_count) {
            Ok(summary) => Ok(summary),
            Err(error) => {
                // Kept with no conflicts; `resolve_all` commits it again
                tracing::warn!("Sync commit failed; resolved merge kept for retry: {error}");
                self.pending = Some(pending);
                Err(error)
            }
        }
    }
}

/// Read the persisted `lastSync` timestamp
pub fn last_sync(kv: &impl KeyValueStore) -> Result<Option<i64>> {
    kv.get_json(keys::LAST_SYNC)
}

fn commit(
    kv: &impl KeyValueStore,
    store: &mut QuoteStore,
    merged: Vec<Quote>,
    remote_count: usize,
) -> Result<SyncSummary> {
    let synced_at = unix_millis_now();
    store.replace_all(
        kv,
        merged,
        &[(keys::LAST_SYNC, serde_json::to_string(&synced_at)?)],
    )?;

    let summary = SyncSummary {
        remote_count,
        total_count: store.len(),
        synced_at,
    };
    tracing::info!(
        "Sync committed: {} quotes ({} from remote)",
        summary.total_count,
        summary.remote_count
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FlakyStore, MemoryStore};
    use crate::models::SERVER_CATEGORY;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    /// Remote stub returning a canned payload or failure
    struct StubRemote {
        response: std::result::Result<Vec<Value>, String>,
    }

    impl StubRemote {
        fn records(records: Vec<Value>) -> Self {
            Self {
                response: Ok(records),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
            }
        }
    }

    impl RemoteSource for StubRemote {
        async fn fetch(&self) -> Result<Vec<Value>> {
            self.response.clone().map_err(Error::SyncTransport)
        }
    }

    fn post(id: u32, title: &str) -> Value {
        json!({"id": id, "title": title, "body": "body", "userId": 1})
    }

    fn setup(local: Vec<Quote>) -> (MemoryStore, QuoteStore) {
        let kv = MemoryStore::new();
        kv.set_json(keys::QUOTES, &local).unwrap();
        let store = QuoteStore::load(&kv).unwrap();
        (kv, store)
    }

    fn local_edit(id: u32, text: &str, category: &str) -> Quote {
        Quote {
            id: Some(QuoteId::server(id)),
            text: text.to_string(),
            category: category.to_string(),
            last_updated: Some(1),
        }
    }

    #[tokio::test]
    async fn clean_sync_commits_and_records_timestamp() {
        let mine = Quote::new("Mine", "Life").unwrap();
        let (kv, mut store) = setup(vec![mine.clone()]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "One")]), 10);

        let outcome = engine.sync_pass(&kv, &mut store).await.unwrap();
        let SyncOutcome::Committed(summary) = outcome else {
            panic!("expected a committed sync");
        };

        assert_eq!(summary.remote_count, 1);
        assert_eq!(summary.total_count, 2);
        assert_eq!(store.quotes()[0].category, SERVER_CATEGORY);
        assert_eq!(store.quotes()[1], mine);
        assert_eq!(last_sync(&kv).unwrap(), Some(summary.synced_at));
        assert_eq!(
            kv.get_json::<Vec<Quote>>(keys::QUOTES).unwrap().unwrap(),
            store.quotes()
        );
    }

    #[tokio::test]
    async fn identical_shared_id_produces_single_quote() {
        let (kv, mut store) = setup(vec![local_edit(1, "Same", SERVER_CATEGORY)]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Same")]), 10);

        let outcome = engine.sync_pass(&kv, &mut store).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Committed(_)));
        let matching = store
            .quotes()
            .iter()
            .filter(|quote| quote.id == Some(QuoteId::server(1)))
            .count();
        assert_eq!(matching, 1);
    }

    #[tokio::test]
    async fn conflict_leaves_store_unchanged_until_resolved() {
        let original = local_edit(1, "Local wording", "Wisdom");
        let (kv, mut store) = setup(vec![original.clone()]);
        let snapshot_before = kv.get(keys::QUOTES).unwrap();
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);

        let outcome = engine.sync_pass(&kv, &mut store).await.unwrap();
        let SyncOutcome::ConflictsPending(conflicts) = outcome else {
            panic!("expected conflicts");
        };
        assert_eq!(conflicts.len(), 1);
        assert_eq!(store.quotes(), &[original.clone()]);
        assert_eq!(kv.get(keys::QUOTES).unwrap(), snapshot_before);
        assert_eq!(last_sync(&kv).unwrap(), None);

        let outcome = engine
            .resolve(&kv, &mut store, &QuoteId::server(1), Resolution::Local)
            .unwrap();
        assert!(matches!(outcome, ResolveOutcome::Committed(_)));

        let kept = &store.quotes()[0];
        assert_eq!(kept.text, original.text);
        assert_eq!(kept.category, original.category);
        assert!(kept.last_updated.unwrap() > 1);
        assert!(last_sync(&kv).unwrap().is_some());
        assert!(!engine.has_pending());
    }

    #[tokio::test]
    async fn resolving_with_server_adopts_remote_content() {
        let (kv, mut store) = setup(vec![local_edit(1, "Local wording", "Wisdom")]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);
        engine.sync_pass(&kv, &mut store).await.unwrap();

        engine
            .resolve(&kv, &mut store, &QuoteId::server(1), Resolution::Server)
            .unwrap();

        assert_eq!(store.quotes()[0].text, "Remote");
        assert_eq!(store.quotes()[0].category, SERVER_CATEGORY);
    }

    #[tokio::test]
    async fn commit_waits_for_every_conflict() {
        let (kv, mut store) = setup(vec![
            local_edit(1, "L1", "A"),
            local_edit(2, "L2", "B"),
        ]);
        let mut engine = SyncEngine::new(
            StubRemote::records(vec![post(1, "R1"), post(2, "R2")]),
            10,
        );
        engine.sync_pass(&kv, &mut store).await.unwrap();
        assert_eq!(engine.pending_conflicts().len(), 2);

        let outcome = engine
            .resolve(&kv, &mut store, &QuoteId::server(2), Resolution::Server)
            .unwrap();
        assert_eq!(outcome, ResolveOutcome::Remaining(1));
        assert_eq!(store.quotes()[1].text, "L2");
        assert_eq!(last_sync(&kv).unwrap(), None);

        engine
            .resolve(&kv, &mut store, &QuoteId::server(1), Resolution::Local)
            .unwrap();
        let texts = store
            .quotes()
            .iter()
            .map(|quote| quote.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["L1", "R2"]);
    }

    #[tokio::test]
    async fn sync_is_rejected_while_conflicts_pending() {
        let (kv, mut store) = setup(vec![local_edit(1, "Local", "A")]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);
        engine.sync_pass(&kv, &mut store).await.unwrap();

        let error = engine.sync_pass(&kv, &mut store).await.unwrap_err();
        assert!(matches!(error, Error::ConflictPending(1)));
    }

    #[tokio::test]
    async fn resolve_all_and_abandon() {
        let (kv, mut store) = setup(vec![local_edit(1, "Local", "A")]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);

        engine.sync_pass(&kv, &mut store).await.unwrap();
        assert_eq!(engine.abandon_pending().unwrap(), 1);
        assert_eq!(store.quotes()[0].text, "Local");
        assert!(matches!(engine.abandon_pending(), Err(Error::NoPendingMerge)));

        engine.sync_pass(&kv, &mut store).await.unwrap();
        let summary = engine
            .resolve_all(&kv, &mut store, Resolution::Server)
            .unwrap();
        assert_eq!(summary.total_count, 1);
        assert_eq!(store.quotes()[0].text, "Remote");
    }

    #[tokio::test]
    async fn resolve_rejects_unknown_ids() {
        let (kv, mut store) = setup(vec![local_edit(1, "Local", "A")]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);

        let error = engine
            .resolve(&kv, &mut store, &QuoteId::server(1), Resolution::Server)
            .unwrap_err();
        assert!(matches!(error, Error::NoPendingMerge));

        engine.sync_pass(&kv, &mut store).await.unwrap();
        let error = engine
            .resolve(&kv, &mut store, &QuoteId::server(5), Resolution::Server)
            .unwrap_err();
        assert!(matches!(error, Error::ConflictNotFound(_)));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_untouched() {
        let (kv, mut store) = setup(vec![Quote::new("Mine", "Life").unwrap()]);
        kv.set_json(keys::LAST_SYNC, &77_i64).unwrap();
        kv.set_json(keys::FILTER, "Life").unwrap();
        let quotes_before = kv.get(keys::QUOTES).unwrap();
        let filter_before = kv.get(keys::FILTER).unwrap();
        let store_before = store.clone();

        let mut engine = SyncEngine::new(StubRemote::failing("connection refused"), 10);
        let error = engine.sync_pass(&kv, &mut store).await.unwrap_err();

        assert!(matches!(error, Error::SyncTransport(_)));
        assert_eq!(store, store_before);
        assert_eq!(kv.get(keys::QUOTES).unwrap(), quotes_before);
        assert_eq!(kv.get(keys::FILTER).unwrap(), filter_before);
        assert_eq!(last_sync(&kv).unwrap(), Some(77));
        assert!(!engine.has_pending());
    }

    #[tokio::test]
    async fn malformed_records_are_dropped() {
        let (kv, mut store) = setup(Vec::new());
        let mut engine = SyncEngine::new(
            StubRemote::records(vec![
                json!({"id": 1, "title": "Good", "body": "b"}),
                json!({"id": 2, "title": "No body"}),
                json!(42),
            ]),
            10,
        );

        let outcome = engine.sync_pass(&kv, &mut store).await.unwrap();
        let SyncOutcome::Committed(summary) = outcome else {
            panic!("expected a committed sync");
        };
        assert_eq!(summary.remote_count, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn failed_final_commit_is_retried_by_resolve_all() {
        let kv = FlakyStore::default();
        kv.set_json(keys::QUOTES, &vec![local_edit(1, "Local wording", "Wisdom")])
            .unwrap();
        let mut store = QuoteStore::load(&kv).unwrap();
        let store_before = store.clone();
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);
        engine.sync_pass(&kv, &mut store).await.unwrap();

        kv.fail_set_many.set(true);
        let error = engine
            .resolve(&kv, &mut store, &QuoteId::server(1), Resolution::Local)
            .unwrap_err();
        assert!(matches!(error, Error::Io(_)));
        assert!(engine.has_pending());
        assert!(engine.pending_conflicts().is_empty());
        assert_eq!(store, store_before);
        assert_eq!(last_sync(&kv).unwrap(), None);
        assert!(matches!(
            engine.sync_pass(&kv, &mut store).await,
            Err(Error::ConflictPending(0))
        ));

        kv.fail_set_many.set(false);
        let summary = engine
            .resolve_all(&kv, &mut store, Resolution::Server)
            .unwrap();

        assert!(!engine.has_pending());
        assert_eq!(store.quotes()[0].text, "Local wording");
        assert_eq!(store.quotes()[0].category, "Wisdom");
        assert_eq!(last_sync(&kv).unwrap(), Some(summary.synced_at));
    }

    #[tokio::test]
    async fn repeated_local_id_survives_resolution() {
        let (kv, mut store) = setup(vec![
            local_edit(1, "Local A", "Wisdom"),
            local_edit(1, "Local B", "Wisdom"),
        ]);
        let mut engine = SyncEngine::new(StubRemote::records(vec![post(1, "Remote")]), 10);

        let outcome = engine.sync_pass(&kv, &mut store).await.unwrap();
        assert!(matches!(outcome, SyncOutcome::ConflictsPending(ref c) if c.len() == 1));

        engine
            .resolve_all(&kv, &mut store, Resolution::Local)
            .unwrap();

        let texts = store
            .quotes()
            .iter()
            .map(|quote| quote.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["Local A", "Local B"]);
    }
}
