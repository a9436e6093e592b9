//! Push channel: the live vote-tally subscription and its reconnect loop.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::JukeboxBackend;
use crate::state::SharedSession;

/// Keep the vote-tally subscription alive until the owning task is aborted.
///
/// Every received broadcast is a full tally state and replaces the local one
/// wholesale. Failures are absorbed: whether the connection attempt fails or
/// an established feed drops, the loop resubscribes after `retry_delay`,
/// forever; the only user-visible consequence of an outage is a briefly stale
/// tally until the next pull or reconnect.
pub async fn run(state: SharedSession, backend: Arc<dyn JukeboxBackend>, retry_delay: Duration) {
    loop {
        match backend.subscribe_votes(state.owner_id()).await {
            Ok(mut feed) => {
                info!(owner_id = state.owner_id(), "vote feed connected");
                while let Some(message) = feed.next().await {
                    match message {
                        Ok(tally) => {
                            debug!(entries = tally.len(), "vote tally received");
                            state.replace_votes(tally).await;
                        }
                        Err(err) => {
                            warn!(error = %err, "vote feed errored; reconnecting");
                            break;
                        }
                    }
                }
                debug!("vote feed closed");
            }
            Err(err) => warn!(error = %err, "vote feed connection failed"),
        }
        sleep(retry_delay).await;
    }
}
