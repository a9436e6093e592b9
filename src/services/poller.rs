//! Periodic pull channel: snapshot fetching and track-change side effects.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::api::JukeboxBackend;
use crate::state::SharedSession;

/// Drive the pull channel until the owning task is aborted.
///
/// The first tick fires immediately on activation; later ticks keep the fixed
/// cadence. A tick whose cycle is still outstanding is skipped, not queued,
/// bounding the engine to one in-flight pull cycle.
pub async fn run(state: SharedSession, backend: Arc<dyn JukeboxBackend>, poll_interval: Duration) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        run_pull_cycle(&state, &backend).await;
    }
}

/// One pull cycle: both snapshots fetched concurrently, applied independently.
///
/// A failed fetch leaves the previous value untouched and records a
/// recoverable error; the other fetch still lands. An observed track change
/// fires the best-effort played notification.
pub(crate) async fn run_pull_cycle(state: &SharedSession, backend: &Arc<dyn JukeboxBackend>) {
    let owner_id = state.owner_id().to_string();
    let (now_playing, queue) = tokio::join!(
        backend.fetch_now_playing(&owner_id),
        backend.fetch_queue(&owner_id),
    );

    match now_playing {
        Ok(item) => {
            if let Some(change) = state.apply_now_playing(item).await {
                debug!(
                    finished = %change.finished.id,
                    started = %change.started.id,
                    "track change observed"
                );
                report_played(Arc::clone(backend), owner_id.clone(), change.finished.id);
            }
        }
        Err(err) => {
            warn!(error = %err, "now-playing fetch failed; keeping previous value");
            state.record_fetch_error(err.to_string()).await;
        }
    }

    match queue {
        Ok(snapshot) => state.apply_queue(snapshot).await,
        Err(err) => {
            warn!(error = %err, "queue fetch failed; keeping previous value");
            state.record_fetch_error(err.to_string()).await;
        }
    }
}

/// Fire-and-forget notification that `track_id` finished playing.
///
/// Failures are logged and never retried; the backend's own reconciliation
/// catches a lost notification eventually.
fn report_played(backend: Arc<dyn JukeboxBackend>, owner_id: String, track_id: String) {
    tokio::spawn(async move {
        if let Err(err) = backend.report_played(&owner_id, &track_id).await {
            warn!(%track_id, error = %err, "played notification failed; not retrying");
        }
    });
}
