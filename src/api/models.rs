//! Wire-format models for the jukebox backend's JSON payloads.

use serde::{Deserialize, Serialize};

use crate::state::Track;

/// Response of `GET /now-playing/{ownerId}`; an empty object means nothing is
/// audible on the owner's device.
#[derive(Debug, Default, Deserialize)]
pub struct NowPlayingResponse {
    #[serde(default)]
    pub item: Option<NowPlayingItem>,
}

/// The currently playing track in the backend's Spotify-shaped format.
#[derive(Debug, Deserialize)]
pub struct NowPlayingItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
}

/// Artist reference carrying only the display name.
#[derive(Debug, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

/// Album reference carrying only the artwork candidates.
#[derive(Debug, Default, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// One artwork candidate; the backend lists them largest first.
#[derive(Debug, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Response of `GET /upcoming-tracks/{ownerId}`.
#[derive(Debug, Default, Deserialize)]
pub struct QueueResponse {
    #[serde(default)]
    pub queue: Vec<QueueEntry>,
}

/// One queued track as reported by the backend, votes and cooldown included.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: AlbumRef,
    #[serde(default)]
    pub votes: u64,
    #[serde(default)]
    pub in_cooldown: bool,
    #[serde(default)]
    pub cooldown_remaining: u32,
}

/// Body of `POST /jukebox/vote`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest<'a> {
    pub owner_id: &'a str,
    pub track_id: &'a str,
    pub client_id: &'a str,
}

/// Body of `POST /jukebox/played`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedRequest<'a> {
    pub owner_id: &'a str,
    pub track_id: &'a str,
}

/// Error body returned on a rejected request; the backend uses either field
/// depending on which layer produced the failure.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message, whichever field the backend filled in.
    pub fn into_message(self, fallback: &str) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl From<NowPlayingItem> for Track {
    fn from(item: NowPlayingItem) -> Self {
        Track {
            id: item.id,
            title: item.name,
            artist_names: item.artists.into_iter().map(|artist| artist.name).collect(),
            artwork_url: item.album.images.into_iter().next().map(|image| image.url),
            vote_count: 0,
            in_cooldown: false,
            cooldown_remaining: 0,
        }
    }
}

impl From<QueueEntry> for Track {
    fn from(entry: QueueEntry) -> Self {
        Track {
            id: entry.id,
            title: entry.name,
            artist_names: entry.artists.into_iter().map(|artist| artist.name).collect(),
            artwork_url: entry.album.images.into_iter().next().map(|image| image.url),
            vote_count: entry.votes,
            in_cooldown: entry.in_cooldown,
            cooldown_remaining: entry.cooldown_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_playing_with_item_converts_to_track() {
        let json = r#"{
            "item": {
                "id": "track1",
                "name": "Flowers",
                "artists": [{"name": "Miley Cyrus"}],
                "album": {"images": [{"url": "https://img/1"}, {"url": "https://img/2"}]}
            }
        }"#;
        let response: NowPlayingResponse = serde_json::from_str(json).unwrap();
        let track = Track::from(response.item.unwrap());
        assert_eq!(track.id, "track1");
        assert_eq!(track.title, "Flowers");
        assert_eq!(track.artist_names, vec!["Miley Cyrus"]);
        assert_eq!(track.artwork_url.as_deref(), Some("https://img/1"));
        assert_eq!(track.vote_count, 0);
    }

    #[test]
    fn empty_now_playing_body_means_nothing_playing() {
        let response: NowPlayingResponse = serde_json::from_str("{}").unwrap();
        assert!(response.item.is_none());
    }

    #[test]
    fn queue_entry_carries_votes_and_cooldown() {
        let json = r#"{
            "queue": [{
                "id": "track2",
                "name": "Blinding Lights",
                "artists": [{"name": "The Weeknd"}],
                "album": {"images": []},
                "votes": 5,
                "inCooldown": true,
                "cooldownRemaining": 2
            }]
        }"#;
        let response: QueueResponse = serde_json::from_str(json).unwrap();
        let track = Track::from(response.queue.into_iter().next().unwrap());
        assert_eq!(track.vote_count, 5);
        assert!(track.in_cooldown);
        assert_eq!(track.cooldown_remaining, 2);
    }

    #[test]
    fn error_body_prefers_the_error_field() {
        let body = ErrorBody {
            error: Some("You have already voted for this song.".into()),
            message: Some("internal".into()),
        };
        assert_eq!(
            body.into_message("status 500"),
            "You have already voted for this song."
        );

        let empty = ErrorBody::default();
        assert_eq!(empty.into_message("status 500"), "status 500");
    }
}
