//! Per-guest session state shared by the pull, push, and vote components.

pub mod playback;
pub mod track;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::error::VoteError;
use crate::services::view::build_view;

pub use self::playback::{Playback, PlaybackTracker, TrackChange};
pub use self::track::Track;

/// Shared handle to one guest's session state.
pub type SharedSession = Arc<SessionState>;

/// Live vote tally keyed by track id, as the backend broadcasts it.
pub type VoteTally = HashMap<String, u64>;

/// Everything a rendered guest view needs, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// The track currently audible on the owner's device, if known.
    pub now_playing: Option<Track>,
    /// Upcoming queue with merged vote counts, in backend order.
    pub queue: Vec<Track>,
    /// Track id of this guest's in-flight (or just-confirmed) vote.
    pub pending_vote: Option<String>,
    /// Classified outcome of the most recent failed vote.
    pub last_vote_error: Option<VoteError>,
    /// Most recent recoverable pull failure; cleared by the next successful
    /// fetch.
    pub last_fetch_error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionData {
    playback: PlaybackTracker,
    queue: Vec<Track>,
    votes: VoteTally,
    pending_vote: Option<String>,
    last_vote_error: Option<VoteError>,
    last_fetch_error: Option<String>,
}

/// Mutable session state scoped to a single owner id.
///
/// Every component mutates the state through these methods, so all writes are
/// serialized behind one lock and each mutation bumps the change watcher.
pub struct SessionState {
    owner_id: Arc<str>,
    data: RwLock<SessionData>,
    changes: watch::Sender<u64>,
}

impl SessionState {
    /// Construct the empty state for a freshly joined session, wrapped in an
    /// [`Arc`] so the background tasks can share it cheaply.
    pub fn new(owner_id: &str) -> SharedSession {
        let (changes, _rx) = watch::channel(0);
        Arc::new(Self {
            owner_id: Arc::from(owner_id),
            data: RwLock::new(SessionData::default()),
            changes,
        })
    }

    /// The session identifier this state is bound to.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Receiver that ticks whenever the state changes.
    pub fn change_watcher(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn mark_changed(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    /// Feed a successful now-playing fetch result into the reconciler.
    ///
    /// On an id transition the finished track's tally entry and any lagging
    /// queue entry are purged here, so the built view is consistent before the
    /// next queue snapshot arrives. Returns the change so the caller can fire
    /// the played notification.
    pub async fn apply_now_playing(&self, item: Option<Track>) -> Option<TrackChange> {
        let mut data = self.data.write().await;
        let change = data.playback.observe(item);
        if let Some(change) = &change {
            data.votes.remove(&change.finished.id);
            // the queue snapshot may lag the now-playing change
            data.queue.retain(|track| track.id != change.finished.id);
        }
        let current_id = data.playback.now_playing().map(|track| track.id.clone());
        if let Some(current_id) = current_id {
            data.queue.retain(|track| track.id != current_id);
        }
        data.last_fetch_error = None;
        drop(data);
        self.mark_changed();
        change
    }

    /// Replace the queue with a fresh snapshot.
    ///
    /// The current now-playing id is kept out of the queue, and tally entries
    /// for tracks no longer visible anywhere are purged — this is the
    /// reconciliation pass that collects vote garbage.
    pub async fn apply_queue(&self, snapshot: Vec<Track>) {
        let mut data = self.data.write().await;
        let current_id = data.playback.now_playing().map(|track| track.id.clone());
        data.queue = match &current_id {
            Some(id) => snapshot.into_iter().filter(|track| &track.id != id).collect(),
            None => snapshot,
        };
        let visible: HashSet<String> = data
            .queue
            .iter()
            .map(|track| track.id.clone())
            .chain(current_id)
            .collect();
        data.votes.retain(|id, _| visible.contains(id));
        data.last_fetch_error = None;
        drop(data);
        self.mark_changed();
    }

    /// Record a recoverable pull failure; the previous snapshot stays as-is.
    pub async fn record_fetch_error(&self, message: String) {
        let mut data = self.data.write().await;
        data.last_fetch_error = Some(message);
        drop(data);
        self.mark_changed();
    }

    /// Replace the vote tally wholesale with a push broadcast.
    ///
    /// Broadcasts are full states with no sequence numbers, so last received
    /// wins; an out-of-order message is corrected by the next pull or push.
    pub async fn replace_votes(&self, tally: VoteTally) {
        let mut data = self.data.write().await;
        data.votes = tally;
        drop(data);
        self.mark_changed();
    }

    /// Current vote tally as last reported by the backend.
    pub async fn vote_tally(&self) -> VoteTally {
        self.data.read().await.votes.clone()
    }

    /// Mark a vote as in flight, enforcing the one-at-a-time rule.
    pub async fn begin_vote(&self, track_id: &str) -> Result<(), VoteError> {
        let mut data = self.data.write().await;
        if data.pending_vote.is_some() {
            return Err(VoteError::InFlight);
        }
        data.pending_vote = Some(track_id.to_string());
        data.last_vote_error = None;
        drop(data);
        self.mark_changed();
        Ok(())
    }

    /// Record the classified outcome of the vote that just responded.
    ///
    /// The pending marker is intentionally left set; it is released separately
    /// once the display cooldown elapses.
    pub async fn record_vote_outcome(&self, error: Option<VoteError>) {
        let mut data = self.data.write().await;
        data.last_vote_error = error;
        drop(data);
        self.mark_changed();
    }

    /// Release the pending-vote marker after the display cooldown.
    pub async fn clear_pending_vote(&self) {
        let mut data = self.data.write().await;
        data.pending_vote = None;
        drop(data);
        self.mark_changed();
    }

    /// Snapshot the state into the display view.
    pub async fn view(&self) -> SessionView {
        let data = self.data.read().await;
        SessionView {
            now_playing: data.playback.now_playing().cloned(),
            queue: build_view(&data.queue, &data.votes),
            pending_vote: data.pending_vote.clone(),
            last_vote_error: data.last_vote_error.clone(),
            last_fetch_error: data.last_fetch_error.clone(),
        }
    }
}
