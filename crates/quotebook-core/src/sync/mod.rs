//! Remote synchronization: fetch, map, merge, and manual conflict resolution.

mod auto;
mod engine;
mod merge;
mod remote;

pub use auto::run_auto_sync;
pub use engine::{last_sync, ResolveOutcome, SyncEngine, SyncOutcome, SyncSummary};
pub use merge::{plan_merge, MergePlan};
pub use remote::{map_remote_records, HttpRemoteSource, RemoteRecord, RemoteSource};
