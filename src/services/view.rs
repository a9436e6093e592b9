//! Pure construction of the queue view shown to the guest.

use indexmap::IndexMap;

use crate::state::{Track, VoteTally};

/// Merge a queue snapshot with the live vote tally into the display sequence.
///
/// Duplicate ids collapse to their first occurrence, preserving relative
/// order. The tally count wins over the snapshot's own count when both exist.
/// Cooldown fields pass through untouched (that arithmetic belongs to the
/// backend), and the output keeps the snapshot's order: votes influence the
/// backend's ordering of future snapshots, not the client-side display.
pub fn build_view(snapshot: &[Track], votes: &VoteTally) -> Vec<Track> {
    let mut unique: IndexMap<&str, &Track> = IndexMap::new();
    for track in snapshot {
        unique.entry(track.id.as_str()).or_insert(track);
    }

    unique
        .into_values()
        .map(|track| {
            let mut track = track.clone();
            if let Some(count) = votes.get(&track.id) {
                track.vote_count = *count;
            }
            track
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, votes: u64) -> Track {
        Track {
            id: id.into(),
            title: format!("title-{id}"),
            artist_names: vec!["artist".into()],
            artwork_url: None,
            vote_count: votes,
            in_cooldown: false,
            cooldown_remaining: 0,
        }
    }

    #[test]
    fn duplicate_ids_collapse_to_first_occurrence() {
        let snapshot = vec![track("a", 1), track("b", 2), track("a", 7)];
        let view = build_view(&snapshot, &VoteTally::new());
        assert_eq!(
            view.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        // the first occurrence's data survives
        assert_eq!(view[0].vote_count, 1);
    }

    #[test]
    fn tally_count_beats_snapshot_count() {
        let snapshot = vec![track("a", 1), track("b", 2)];
        let votes = VoteTally::from([("a".into(), 9)]);
        let view = build_view(&snapshot, &votes);
        assert_eq!(view[0].vote_count, 9);
        assert_eq!(view[1].vote_count, 2);
    }

    #[test]
    fn order_is_snapshot_order_not_vote_order() {
        let snapshot = vec![track("low", 0), track("high", 0)];
        let votes = VoteTally::from([("high".into(), 50)]);
        let view = build_view(&snapshot, &votes);
        assert_eq!(view[0].id, "low");
        assert_eq!(view[1].id, "high");
    }

    #[test]
    fn cooldown_fields_pass_through() {
        let mut cooling = track("a", 0);
        cooling.in_cooldown = true;
        cooling.cooldown_remaining = 3;
        let view = build_view(&[cooling.clone()], &VoteTally::new());
        assert_eq!(view, vec![cooling]);
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let snapshot = vec![track("a", 1), track("b", 2), track("a", 3)];
        let votes = VoteTally::from([("b".into(), 4)]);
        assert_eq!(build_view(&snapshot, &votes), build_view(&snapshot, &votes));
    }
}
