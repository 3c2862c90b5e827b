use cratedig::error::ApiError;
use cratedig::table::{extract_track_record, tabulate_playlist, tabulate_recommendations};
use cratedig::types::{PlaylistItem, PlaylistResponse, PlaylistTracks, RawArtist, RawTrack, RecommendationsResponse};

// Helper function to create a raw track payload
fn raw_track(id: &str, name: &str, artist: &str) -> RawTrack {
    RawTrack {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        artists: vec![RawArtist {
            name: artist.to_string(),
        }],
    }
}

fn playlist_response(tracks: Vec<Option<RawTrack>>) -> PlaylistResponse {
    PlaylistResponse {
        tracks: PlaylistTracks {
            items: tracks
                .into_iter()
                .map(|track| PlaylistItem { track })
                .collect(),
        },
    }
}

#[test]
fn test_extract_preserves_identity() {
    let raw = raw_track("4uLU6hMCjMI75M1A2tKUQC", "Never Gonna Give You Up", "Rick Astley");
    let record = extract_track_record(&raw, 3).unwrap();

    assert_eq!(record.id, "4uLU6hMCjMI75M1A2tKUQC");
    assert_eq!(record.track_name, "Never Gonna Give You Up");
    assert_eq!(record.artist_name, "Rick Astley");
    assert_eq!(record.position, 3);
}

#[test]
fn test_extract_rejects_missing_fields() {
    let mut missing_id = raw_track("x", "Song", "Artist");
    missing_id.id = None;
    assert!(matches!(
        extract_track_record(&missing_id, 0),
        Err(ApiError::MalformedTrack(_))
    ));

    let mut empty_id = raw_track("x", "Song", "Artist");
    empty_id.id = Some(String::new());
    assert!(matches!(
        extract_track_record(&empty_id, 0),
        Err(ApiError::MalformedTrack(_))
    ));

    let mut missing_name = raw_track("x", "Song", "Artist");
    missing_name.name = None;
    assert!(matches!(
        extract_track_record(&missing_name, 0),
        Err(ApiError::MalformedTrack(_))
    ));

    let mut no_artists = raw_track("x", "Song", "Artist");
    no_artists.artists.clear();
    assert!(matches!(
        extract_track_record(&no_artists, 0),
        Err(ApiError::MalformedTrack(_))
    ));
}

#[test]
fn test_tabulate_playlist_assigns_ordinals_in_response_order() {
    let response = playlist_response(vec![
        Some(raw_track("a", "First", "Artist A")),
        Some(raw_track("b", "Second", "Artist B")),
        Some(raw_track("c", "Third", "Artist C")),
    ]);

    let table = tabulate_playlist(&response);

    assert_eq!(table.len(), 3);
    let keys: Vec<&String> = table.keys().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    let positions: Vec<usize> = table.values().map(|r| r.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn test_tabulate_playlist_is_idempotent() {
    let response = playlist_response(vec![
        Some(raw_track("a", "First", "Artist A")),
        Some(raw_track("b", "Second", "Artist B")),
    ]);

    assert_eq!(tabulate_playlist(&response), tabulate_playlist(&response));
}

#[test]
fn test_tabulate_playlist_keeps_first_occurrence_of_duplicates() {
    let response = playlist_response(vec![
        Some(raw_track("a", "Original", "Artist A")),
        Some(raw_track("b", "Other", "Artist B")),
        Some(raw_track("a", "Duplicate", "Artist A")),
    ]);

    let table = tabulate_playlist(&response);

    // keys stay unique, the first occurrence wins
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("a").unwrap().track_name, "Original");
}

#[test]
fn test_tabulate_playlist_skips_malformed_entries() {
    let mut broken = raw_track("b", "Broken", "Artist");
    broken.name = None;

    let response = playlist_response(vec![
        Some(raw_track("a", "Fine", "Artist A")),
        Some(broken),
        None, // removed/unavailable playlist entry
        Some(raw_track("c", "Also fine", "Artist C")),
    ]);

    let table = tabulate_playlist(&response);

    // one malformed entry never voids the batch
    assert_eq!(table.len(), 2);
    let keys: Vec<&String> = table.keys().collect();
    assert_eq!(keys, vec!["a", "c"]);
    // ordinals reflect the source response, not the surviving rows
    assert_eq!(table.get("c").unwrap().position, 3);
}

#[test]
fn test_tabulate_recommendations_reads_flat_track_list() {
    let response = RecommendationsResponse {
        tracks: vec![
            raw_track("r1", "Rec One", "Artist R"),
            raw_track("r2", "Rec Two", "Artist S"),
        ],
    };

    let table = tabulate_recommendations(&response);

    assert_eq!(table.len(), 2);
    assert_eq!(table.get("r1").unwrap().position, 0);
    assert_eq!(table.get("r2").unwrap().position, 1);
    assert!(table.values().all(|r| !r.track_name.is_empty()));
    assert!(table.values().all(|r| !r.artist_name.is_empty()));
}
