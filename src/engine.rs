//! Lifetime owner of one guest's synchronized session view.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::JukeboxBackend;
use crate::config::EngineConfig;
use crate::error::VoteError;
use crate::services::{poller, push, vote};
use crate::state::{SessionState, SessionView, SharedSession};

/// Handle owning the pull and push channels for one session.
///
/// Created when the guest's view of a session is mounted and dropped when it
/// is torn down. Dropping (or shutting down) the engine cancels both
/// background tasks, so a guest switching sessions never leaks a subscription
/// or timer, and an in-flight vote's response is discarded without further
/// state mutation.
pub struct SessionEngine {
    state: SharedSession,
    backend: Arc<dyn JukeboxBackend>,
    config: EngineConfig,
    guest_id: String,
    pull_task: JoinHandle<()>,
    push_task: JoinHandle<()>,
}

impl SessionEngine {
    /// Create the session state for `owner_id` and activate both sync
    /// channels; the pull channel fires immediately.
    pub fn start(
        config: EngineConfig,
        backend: Arc<dyn JukeboxBackend>,
        owner_id: &str,
        guest_id: &str,
    ) -> Self {
        let state = SessionState::new(owner_id);
        let pull_task = tokio::spawn(poller::run(
            Arc::clone(&state),
            Arc::clone(&backend),
            config.poll_interval,
        ));
        let push_task = tokio::spawn(push::run(
            Arc::clone(&state),
            Arc::clone(&backend),
            config.push_retry_delay,
        ));
        Self {
            state,
            backend,
            config,
            guest_id: guest_id.to_string(),
            pull_task,
            push_task,
        }
    }

    /// The session identifier this engine is bound to.
    pub fn owner_id(&self) -> &str {
        self.state.owner_id()
    }

    /// The guest identity votes are attributed to.
    pub fn guest_id(&self) -> &str {
        &self.guest_id
    }

    /// Submit a vote for `track_id` on behalf of this guest.
    pub async fn cast_vote(&self, track_id: &str) -> Result<(), VoteError> {
        vote::cast_vote(
            &self.state,
            &self.backend,
            &self.guest_id,
            track_id,
            self.config.vote_cooldown,
        )
        .await
    }

    /// Snapshot the current synchronized view.
    pub async fn view(&self) -> SessionView {
        self.state.view().await
    }

    /// Receiver that ticks whenever the session state changes.
    pub fn update_watcher(&self) -> watch::Receiver<u64> {
        self.state.change_watcher()
    }

    /// Tear the view down: cancel the pull timer and release the push
    /// subscription.
    pub fn shutdown(&self) {
        self.pull_task.abort();
        self.push_task.abort();
        debug!(owner_id = self.state.owner_id(), "session engine shut down");
    }
}

impl Drop for SessionEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use futures::{StreamExt, stream};

    use super::*;
    use crate::api::{ApiResult, VoteStream};
    use crate::state::{Track, VoteTally};

    /// Backend with one static track playing, one queued track, and a single
    /// tally broadcast.
    struct StaticBackend;

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            title: format!("title-{id}"),
            artist_names: vec!["artist".into()],
            artwork_url: None,
            vote_count: 0,
            in_cooldown: false,
            cooldown_remaining: 0,
        }
    }

    impl JukeboxBackend for StaticBackend {
        fn fetch_now_playing(&self, _: &str) -> BoxFuture<'static, ApiResult<Option<Track>>> {
            Box::pin(async { Ok(Some(track("x"))) })
        }

        fn fetch_queue(&self, _: &str) -> BoxFuture<'static, ApiResult<Vec<Track>>> {
            Box::pin(async { Ok(vec![track("y")]) })
        }

        fn submit_vote(&self, _: &str, _: &str, _: &str) -> BoxFuture<'static, ApiResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn report_played(&self, _: &str, _: &str) -> BoxFuture<'static, ApiResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn subscribe_votes(&self, _: &str) -> BoxFuture<'static, ApiResult<VoteStream>> {
            Box::pin(async {
                let feed = stream::iter(vec![Ok(VoteTally::from([("y".into(), 2)]))])
                    .chain(stream::pending());
                Ok(feed.boxed())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn engine_synchronizes_view_from_both_channels() {
        let engine = SessionEngine::start(
            EngineConfig::default(),
            Arc::new(StaticBackend),
            "owner001",
            "guest-test",
        );

        let mut updates = engine.update_watcher();
        updates.changed().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let view = engine.view().await;
        assert_eq!(view.now_playing, Some(track("x")));
        assert_eq!(view.queue.len(), 1);
        assert_eq!(view.queue[0].id, "y");
        // the tally broadcast overrode the snapshot count
        assert_eq!(view.queue[0].vote_count, 2);

        engine.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn votes_are_attributed_to_the_stored_guest_identity() {
        let engine = SessionEngine::start(
            EngineConfig::default(),
            Arc::new(StaticBackend),
            "owner001",
            "guest-test",
        );
        assert_eq!(engine.owner_id(), "owner001");
        assert_eq!(engine.guest_id(), "guest-test");

        engine.cast_vote("y").await.unwrap();
        assert_eq!(engine.view().await.pending_vote, Some("y".into()));
    }
}
