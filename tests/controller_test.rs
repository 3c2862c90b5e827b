use cratedig::controller::{SessionStore, TablePane, UiState};
use cratedig::table::{TrackRecord, TrackTable};

fn pane_with(ids: &[&str]) -> TablePane {
    let mut table = TrackTable::new();
    for (position, id) in ids.iter().enumerate() {
        table.insert(
            id.to_string(),
            TrackRecord {
                id: id.to_string(),
                track_name: format!("Track {id}"),
                artist_name: "Artist".to_string(),
                position,
            },
        );
    }
    TablePane {
        table,
        fetch_failed: None,
    }
}

#[test]
fn test_row_selection_resolves_to_track_ids() {
    let pane = pane_with(&["a", "b", "c"]);

    assert_eq!(pane.ids_at(&[0, 2]), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(pane.ids_at(&[]), Vec::<String>::new());
}

#[test]
fn test_stale_row_indices_are_dropped() {
    let pane = pane_with(&["a", "b"]);

    // a selection submitted against an older, longer table
    assert_eq!(pane.ids_at(&[1, 5]), vec!["b".to_string()]);
}

#[test]
fn test_sessions_are_isolated_by_key() {
    let mut store = SessionStore::default();

    store.get_or_create("alpha").playlist_id = "custom-playlist".to_string();
    assert_ne!(store.get_or_create("beta").playlist_id, "custom-playlist");
    assert_eq!(
        store.get_or_create("alpha").playlist_id,
        "custom-playlist"
    );
    assert_eq!(store.len(), 2);
}

#[test]
fn test_notice_is_consumed_on_render() {
    let mut ui = UiState::default();
    ui.notice = Some("Select a track to play.".to_string());

    assert_eq!(ui.take_notice().as_deref(), Some("Select a track to play."));
    assert_eq!(ui.take_notice(), None);
}

#[test]
fn test_sign_out_clears_fetched_panes() {
    let mut ui = UiState::default();
    ui.playlist = pane_with(&["a"]);
    ui.recommendations = pane_with(&["r"]);
    ui.sign_out();

    assert!(ui.playlist.table.is_empty());
    assert!(ui.recommendations.table.is_empty());
    assert!(!ui.session.is_authorized());
}
