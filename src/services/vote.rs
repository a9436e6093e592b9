//! Vote submission with the one-in-flight rule and display cooldown.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::{ApiError, JukeboxBackend};
use crate::error::VoteError;
use crate::state::SharedSession;

/// Submit a guest vote for `track_id`.
///
/// Rejected locally, with no network call, while another vote is in flight.
/// After the backend responds the pending marker stays visible for
/// `display_cooldown` so the caller can render a transient confirmation, then
/// the vote affordance is released whatever the outcome was. There is no
/// optimistic local increment: the displayed count only moves once the push
/// channel broadcasts the new tally.
pub async fn cast_vote(
    state: &SharedSession,
    backend: &Arc<dyn JukeboxBackend>,
    guest_id: &str,
    track_id: &str,
    display_cooldown: Duration,
) -> Result<(), VoteError> {
    state.begin_vote(track_id).await?;

    let result = backend
        .submit_vote(state.owner_id(), track_id, guest_id)
        .await;
    let outcome = match result {
        Ok(()) => Ok(()),
        Err(ApiError::Rejected { message }) => Err(VoteError::classify(&message)),
        Err(err) => Err(VoteError::Transient(err.to_string())),
    };

    match &outcome {
        Ok(()) => debug!(%track_id, "vote accepted"),
        Err(VoteError::Duplicate) => debug!(%track_id, "vote rejected as duplicate"),
        Err(err) => warn!(%track_id, error = %err, "vote failed"),
    }
    state.record_vote_outcome(outcome.clone().err()).await;

    let state = Arc::clone(state);
    tokio::spawn(async move {
        sleep(display_cooldown).await;
        state.clear_pending_vote().await;
    });

    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::api::{ApiResult, VoteStream};
    use crate::state::{SessionState, Track};

    /// Backend whose vote endpoint is scripted per test.
    struct VotingBackend {
        calls: AtomicUsize,
        rejection: Option<String>,
    }

    impl VotingBackend {
        fn accepting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rejection: None,
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rejection: Some(message.to_string()),
            }
        }
    }

    impl JukeboxBackend for VotingBackend {
        fn fetch_now_playing(&self, _: &str) -> BoxFuture<'static, ApiResult<Option<Track>>> {
            Box::pin(async { Ok(None) })
        }

        fn fetch_queue(&self, _: &str) -> BoxFuture<'static, ApiResult<Vec<Track>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn submit_vote(&self, _: &str, _: &str, _: &str) -> BoxFuture<'static, ApiResult<()>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rejection = self.rejection.clone();
            Box::pin(async move {
                match rejection {
                    Some(message) => Err(ApiError::Rejected { message }),
                    None => Ok(()),
                }
            })
        }

        fn report_played(&self, _: &str, _: &str) -> BoxFuture<'static, ApiResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn subscribe_votes(&self, _: &str) -> BoxFuture<'static, ApiResult<VoteStream>> {
            Box::pin(async { Err(ApiError::Rejected { message: "unused".into() }) })
        }
    }

    const COOLDOWN: Duration = Duration::from_secs(2);

    #[tokio::test(start_paused = true)]
    async fn pending_vote_blocks_a_second_submission() {
        let state = SessionState::new("owner001");
        let voting = Arc::new(VotingBackend::accepting());
        let backend: Arc<dyn JukeboxBackend> = voting.clone();

        cast_vote(&state, &backend, "guest-1", "a", COOLDOWN)
            .await
            .unwrap();
        let second = cast_vote(&state, &backend, "guest-1", "b", COOLDOWN).await;

        assert_eq!(second, Err(VoteError::InFlight));
        // the second attempt never reached the network
        assert_eq!(voting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.view().await.pending_vote, Some("a".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn pending_marker_clears_after_display_cooldown() {
        let state = SessionState::new("owner001");
        let backend: Arc<dyn JukeboxBackend> = Arc::new(VotingBackend::accepting());

        cast_vote(&state, &backend, "guest-1", "a", COOLDOWN)
            .await
            .unwrap();
        assert_eq!(state.view().await.pending_vote, Some("a".into()));

        sleep(COOLDOWN + Duration::from_millis(50)).await;
        assert_eq!(state.view().await.pending_vote, None);

        // the affordance is usable again
        cast_vote(&state, &backend, "guest-1", "b", COOLDOWN)
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_rejection_is_classified_and_surfaced() {
        let state = SessionState::new("owner001");
        let backend: Arc<dyn JukeboxBackend> =
            Arc::new(VotingBackend::rejecting("You have already voted for this song."));

        let outcome = cast_vote(&state, &backend, "guest-1", "a", COOLDOWN).await;
        assert_eq!(outcome, Err(VoteError::Duplicate));
        assert_eq!(state.view().await.last_vote_error, Some(VoteError::Duplicate));
    }

    #[tokio::test(start_paused = true)]
    async fn other_rejections_are_transient() {
        let state = SessionState::new("owner001");
        let backend: Arc<dyn JukeboxBackend> =
            Arc::new(VotingBackend::rejecting("playback device unavailable"));

        let outcome = cast_vote(&state, &backend, "guest-1", "a", COOLDOWN).await;
        assert_eq!(
            outcome,
            Err(VoteError::Transient("playback device unavailable".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_attempt_clears_the_previous_error() {
        let state = SessionState::new("owner001");
        let rejecting: Arc<dyn JukeboxBackend> =
            Arc::new(VotingBackend::rejecting("You have already voted for this song."));
        let _ = cast_vote(&state, &rejecting, "guest-1", "a", COOLDOWN).await;
        sleep(COOLDOWN + Duration::from_millis(50)).await;

        let accepting: Arc<dyn JukeboxBackend> = Arc::new(VotingBackend::accepting());
        cast_vote(&state, &accepting, "guest-1", "b", COOLDOWN)
            .await
            .unwrap();
        assert_eq!(state.view().await.last_vote_error, None);
    }
}
