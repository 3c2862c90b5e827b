//! Track record extraction and table building.
//!
//! Raw playlist and recommendation payloads are flattened into
//! [`TrackTable`]s: ordered maps keyed by track id, re-created wholesale on
//! every fetch. The zero-based position within the source response is
//! assigned before re-keying and kept on the record, since the natural order
//! would otherwise be lost once rows are addressed by id.

use indexmap::IndexMap;

use crate::{
    error::ApiError,
    types::{PlaylistResponse, RawTrack, RecommendationsResponse},
    warning,
};

/// One flattened track row. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub id: String,
    pub track_name: String,
    pub artist_name: String,
    /// Zero-based ordinal within the source response.
    pub position: usize,
}

/// Ordered mapping from track id to record; insertion order is response order.
pub type TrackTable = IndexMap<String, TrackRecord>;

/// Normalizes a single raw track payload into a flat record.
///
/// Requires an id, a name and at least one artist; anything less is a
/// [`ApiError::MalformedTrack`]. The caller decides whether to skip or abort;
/// both tabulators skip, so one malformed entry never voids a fetch.
pub fn extract_track_record(raw: &RawTrack, position: usize) -> Result<TrackRecord, ApiError> {
    let id = match raw.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(ApiError::MalformedTrack("missing track id".to_string())),
    };
    let track_name = match raw.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            return Err(ApiError::MalformedTrack(format!(
                "track {id} is missing a name"
            )));
        }
    };
    let artist_name = match raw.artists.first() {
        Some(artist) => artist.name.clone(),
        None => {
            return Err(ApiError::MalformedTrack(format!(
                "track {id} has no artists"
            )));
        }
    };

    Ok(TrackRecord {
        id,
        track_name,
        artist_name,
        position,
    })
}

/// Converts a playlist fetch response into a track table.
///
/// Playlist items nest the track payload under `.track`. Malformed or absent
/// entries are skipped with a warning; on duplicate ids the first occurrence
/// wins, so keys stay unique.
pub fn tabulate_playlist(response: &PlaylistResponse) -> TrackTable {
    collect_records(
        response
            .tracks
            .items
            .iter()
            .map(|item| item.track.as_ref()),
    )
}

/// Converts a recommendations response into a track table. Recommendation
/// items are raw tracks directly; otherwise identical to
/// [`tabulate_playlist`].
pub fn tabulate_recommendations(response: &RecommendationsResponse) -> TrackTable {
    collect_records(response.tracks.iter().map(Some))
}

fn collect_records<'a>(tracks: impl Iterator<Item = Option<&'a RawTrack>>) -> TrackTable {
    let mut table = TrackTable::new();
    for (position, raw) in tracks.enumerate() {
        let Some(raw) = raw else {
            warning!("Skipping empty track entry at position {}", position);
            continue;
        };
        match extract_track_record(raw, position) {
            Ok(record) => {
                if table.contains_key(&record.id) {
                    warning!("Skipping duplicate track {} at position {}", record.id, position);
                    continue;
                }
                table.insert(record.id.clone(), record);
            }
            Err(e) => warning!("Skipping track at position {}: {}", position, e),
        }
    }
    table
}
