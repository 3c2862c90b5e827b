use cratedig::filters::FilterSet;

#[test]
fn test_default_set_matches_slider_layout() {
    let filters = FilterSet::default();
    let names: Vec<&str> = filters.iter().map(|(name, _)| name).collect();

    assert_eq!(
        names,
        vec![
            "tempo",
            "key",
            "mode",
            "acousticness",
            "danceability",
            "energy",
            "instrumentalness",
            "liveness",
            "loudness",
            "speechiness",
            "valence",
        ]
    );

    let tempo = filters.get("tempo").unwrap();
    assert_eq!(tempo.label, "Tempo (BPM)");
    assert_eq!(tempo.min, 80.0);
    assert_eq!(tempo.max, 160.0);
    // selected range initially spans the whole slider
    assert_eq!(tempo.low, 80.0);
    assert_eq!(tempo.high, 160.0);
    assert_eq!(tempo.step, None);

    let energy = filters.get("energy").unwrap();
    assert_eq!(energy.step, Some(0.05));
    assert_eq!(energy.min, 0.0);
    assert_eq!(energy.max, 1.0);

    let loudness = filters.get("loudness").unwrap();
    assert_eq!(loudness.min, -60.0);
    assert_eq!(loudness.max, 0.0);
}

#[test]
fn test_set_range_updates_selection() {
    let mut filters = FilterSet::default();

    assert!(filters.set_range("tempo", 115.0, 135.0));
    let tempo = filters.get("tempo").unwrap();
    assert_eq!((tempo.low, tempo.high), (115.0, 135.0));
}

#[test]
fn test_set_range_clamps_out_of_range_values() {
    let mut filters = FilterSet::default();

    filters.set_range("tempo", 20.0, 500.0);
    let tempo = filters.get("tempo").unwrap();
    assert_eq!((tempo.low, tempo.high), (80.0, 160.0));

    filters.set_range("loudness", -120.0, 10.0);
    let loudness = filters.get("loudness").unwrap();
    assert_eq!((loudness.low, loudness.high), (-60.0, 0.0));
}

#[test]
fn test_set_range_reorders_inverted_pairs() {
    let mut filters = FilterSet::default();

    filters.set_range("energy", 0.8, 0.2);
    let energy = filters.get("energy").unwrap();
    assert_eq!((energy.low, energy.high), (0.2, 0.8));
}

#[test]
fn test_low_never_exceeds_high_after_updates() {
    let mut filters = FilterSet::default();
    let updates = [
        ("tempo", 160.0, 80.0),
        ("tempo", -10.0, 999.0),
        ("valence", 1.5, -0.5),
        ("key", 11.0, 0.0),
    ];

    for (attribute, low, high) in updates {
        filters.set_range(attribute, low, high);
        let spec = filters.get(attribute).unwrap();
        assert!(spec.low <= spec.high);
        assert!(spec.low >= spec.min && spec.high <= spec.max);
    }
}

#[test]
fn test_unknown_attribute_is_rejected() {
    let mut filters = FilterSet::default();
    assert!(!filters.set_range("bitrate", 0.0, 1.0));
    assert!(filters.get("bitrate").is_none());
}

#[test]
fn test_query_params_carry_min_max_pairs() {
    let mut filters = FilterSet::default();
    filters.set_range("tempo", 100.0, 120.0);

    let params = filters.query_params();

    // one min/max pair per attribute
    assert_eq!(params.len(), 22);
    assert!(params.contains(&("min_tempo".to_string(), "100".to_string())));
    assert!(params.contains(&("max_tempo".to_string(), "120".to_string())));
    assert!(params.contains(&("min_energy".to_string(), "0".to_string())));
    assert!(params.contains(&("max_energy".to_string(), "1".to_string())));
}
