//! Recurring sync trigger.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::app::SharedApp;
use crate::db::KeyValueStore;
use crate::error::Result;

use super::{RemoteSource, SyncOutcome};

/// Run sync passes every `period` until auto-sync is switched off.
///
/// The loop checks `switch` and the persisted preference at every tick, so
/// disabling takes effect at the next tick while a running pass completes.
/// Each pass result (including rejections) is handed to `on_pass`; returning
/// `ControlFlow::Break` stops the loop right away instead of at the next tick.
/// Returns the number of passes attempted.
pub async fn run_auto_sync<S, R, F>(
    app: &SharedApp<S, R>,
    period: Duration,
    switch: watch::Receiver<bool>,
    mut on_pass: F,
) -> Result<usize>
where
    S: KeyValueStore,
    R: RemoteSource,
    F: FnMut(&Result<SyncOutcome>) -> ControlFlow<()>,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut passes = 0;

    loop {
        ticker.tick().await;

        if !*switch.borrow() {
            tracing::info!("Auto-sync switched off");
            break;
        }
        if !app.lock().await.auto_sync_enabled()? {
            tracing::info!("Auto-sync disabled in preferences");
            break;
        }

        let result = app.try_sync().await;
        if let Err(error) = &result {
            tracing::warn!("Auto-sync pass did not complete: {error}");
        }
        passes += 1;
        if on_pass(&result).is_break() {
            tracing::debug!("Auto-sync stopped by pass handler");
            break;
        }
    }

    Ok(passes)
}
