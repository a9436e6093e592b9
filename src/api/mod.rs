//! Client boundary to the jukebox backend: the trait seam the engine consumes
//! and its `reqwest`-backed implementation.

mod error;
mod http;
mod models;

use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::state::{Track, VoteTally};

pub use self::error::{ApiError, ApiResult};
pub use self::http::HttpJukeboxApi;

/// Stream of vote-tally broadcasts from the session's push topic.
pub type VoteStream = BoxStream<'static, ApiResult<VoteTally>>;

/// Abstraction over the jukebox backend consumed by the sync engine.
///
/// The engine never owns network primitives directly; it talks to whatever
/// implements this trait, which keeps every component testable against an
/// in-memory fake.
pub trait JukeboxBackend: Send + Sync {
    /// Fetch the owner's currently playing track, if any.
    fn fetch_now_playing(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<Option<Track>>>;

    /// Fetch the owner's upcoming queue snapshot.
    fn fetch_queue(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<Vec<Track>>>;

    /// Submit one guest vote for a queued track.
    fn submit_vote(
        &self,
        owner_id: &str,
        track_id: &str,
        guest_id: &str,
    ) -> BoxFuture<'static, ApiResult<()>>;

    /// Tell the backend a track finished playing so its votes can be reset.
    fn report_played(&self, owner_id: &str, track_id: &str) -> BoxFuture<'static, ApiResult<()>>;

    /// Open the session-scoped vote-tally subscription.
    fn subscribe_votes(&self, owner_id: &str) -> BoxFuture<'static, ApiResult<VoteStream>>;
}
