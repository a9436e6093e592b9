/// One playable unit inside a session, as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Opaque identifier, stable across snapshots within one session.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Performing artists, in the order the backend lists them.
    pub artist_names: Vec<String>,
    /// Cover artwork, when the backend supplied one.
    pub artwork_url: Option<String>,
    /// Vote count; authoritative from the backend unless the live tally
    /// overrides it at view-build time.
    pub vote_count: u64,
    /// Whether the backend currently suppresses votes for this track.
    pub in_cooldown: bool,
    /// How many more plays until the cooldown lifts; meaningful only while
    /// [`Track::in_cooldown`] is set.
    pub cooldown_remaining: u32,
}
