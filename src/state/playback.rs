use crate::state::track::Track;

/// Observed playback position of the owner's session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Playback {
    /// No now-playing snapshot has been observed yet.
    #[default]
    Unknown,
    /// The most recently observed now-playing track.
    Known(Track),
}

/// Emitted when the authoritative now-playing id moved to a different track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChange {
    /// The track that just finished playing.
    pub finished: Track,
    /// The track that replaced it.
    pub started: Track,
}

/// State machine detecting track changes across successive now-playing
/// snapshots.
///
/// Only an id transition between two observed tracks counts as a change, so
/// polling jitter, repeated snapshots of the same track, and transient fetch
/// misses can never fire the change side effects twice.
#[derive(Debug, Clone, Default)]
pub struct PlaybackTracker {
    current: Playback,
}

impl PlaybackTracker {
    /// Create a tracker that has not observed any snapshot yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently observed now-playing track, if any.
    pub fn now_playing(&self) -> Option<&Track> {
        match &self.current {
            Playback::Unknown => None,
            Playback::Known(track) => Some(track),
        }
    }

    /// Feed one now-playing snapshot into the tracker.
    ///
    /// An absent item is a transient fetch miss and never transitions the
    /// tracker. A snapshot carrying the same id as the current track is
    /// ignored, metadata refresh included. Returns the change exactly once
    /// per observed id transition.
    pub fn observe(&mut self, item: Option<Track>) -> Option<TrackChange> {
        let Some(item) = item else {
            return None;
        };

        match std::mem::take(&mut self.current) {
            Playback::Unknown => {
                self.current = Playback::Known(item);
                None
            }
            Playback::Known(prev) if prev.id == item.id => {
                self.current = Playback::Known(prev);
                None
            }
            Playback::Known(prev) => {
                self.current = Playback::Known(item.clone());
                Some(TrackChange {
                    finished: prev,
                    started: item,
                })
            }
        }
    }
}
