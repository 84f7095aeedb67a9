//! Integration tests for the taste enrichment pipeline
//!
//! Exercised through `TasteEnricher` with in-memory fakes for the store,
//! the catalog, and the streaming provider. No network access.

mod helpers;

use helpers::{artist, genre, TestApp};
use tunematch_common::db::User;
use tunematch_common::model::{FavoriteTrack, Provider};
use tunematch_server::services::TrackDetails;

fn user(id: i64, email_spotify: Option<&str>) -> User {
    User {
        id,
        username: format!("user{}", id),
        email_spotify: email_spotify.map(|e| e.to_string()),
        email_twitch: None,
        email_google: None,
    }
}

fn provider_track(name: &str, artist: &str, id: &str) -> FavoriteTrack {
    FavoriteTrack {
        id: id.to_string(),
        name: name.to_string(),
        artist: artist.to_string(),
        artist_id: None,
        album_name: None,
        album_id: None,
        image_url: None,
        item_type: "track".to_string(),
        source: Some("spotify".to_string()),
    }
}

#[tokio::test]
async fn empty_favorites_fall_back_to_popular_genres() {
    let app = TestApp::new();
    app.store.add_user(1, "alice", None);
    let fallback: Vec<_> = (1..=12).map(|i| genre(i, &format!("Genre {}", i))).collect();
    app.catalog.set_fallback_genres(fallback);

    let taste = app.enricher().enrich(&user(1, None)).await;

    assert!(taste.tracks.is_empty());
    assert!(taste.artists.is_empty());
    // Fallback genres, capped
    assert_eq!(taste.genres.len(), 10);
    assert_eq!(taste.genres[0].name, "Genre 1");
}

#[tokio::test]
async fn catalog_tracks_gain_ids_artists_and_genres() {
    let app = TestApp::new();
    app.store.add_user(1, "alice", None);
    app.store.set_favorites_blob(
        1,
        r#"["Rock", {"id": 100, "name": "Song", "artist": "Band", "type": "track"}]"#,
    );

    app.catalog.add_track(
        "100",
        TrackDetails {
            artist_id: Some("7".to_string()),
            album_id: Some("55".to_string()),
        },
    );
    app.catalog.add_album_genres("55", vec![genre(1, "Rock")]);
    app.catalog.add_artist("7", artist(7, "Band"));
    app.catalog.add_artist_top_track(
        "7",
        TrackDetails {
            artist_id: Some("7".to_string()),
            album_id: Some("55".to_string()),
        },
    );

    let taste = app.enricher().enrich(&user(1, None)).await;

    // Tag favorites pass through untouched
    assert_eq!(taste.tracks.len(), 2);
    let track = taste.tracks[1].as_track().expect("track favorite");
    assert_eq!(track.artist_id.as_deref(), Some("7"));
    assert_eq!(track.album_id.as_deref(), Some("55"));

    assert_eq!(taste.artists.len(), 1);
    assert_eq!(taste.artists[0].name, "Band");

    // Real genres found, so the fallback list is not consulted
    assert_eq!(taste.genres.len(), 1);
    assert_eq!(taste.genres[0].name, "Rock");
}

#[tokio::test]
async fn one_failing_lookup_does_not_poison_the_rest() {
    let app = TestApp::new();
    app.store.add_user(1, "alice", None);
    app.store.set_favorites_blob(
        1,
        r#"[
            {"id": 100, "name": "Broken", "artist": "Band A", "type": "track"},
            {"id": 200, "name": "Fine", "artist": "Band B", "type": "track"}
        ]"#,
    );

    app.catalog.fail_track("100");
    app.catalog.add_track(
        "200",
        TrackDetails {
            artist_id: Some("9".to_string()),
            album_id: Some("77".to_string()),
        },
    );
    app.catalog.add_album_genres("77", vec![genre(2, "Jazz")]);
    app.catalog.add_artist("9", artist(9, "Band B"));

    let taste = app.enricher().enrich(&user(1, None)).await;

    // The failing track stays in the list, just without resolved ids
    assert_eq!(taste.tracks.len(), 2);
    assert!(taste.tracks[0].as_track().unwrap().artist_id.is_none());
    assert_eq!(
        taste.tracks[1].as_track().unwrap().artist_id.as_deref(),
        Some("9")
    );

    assert_eq!(taste.artists.len(), 1);
    assert_eq!(taste.genres[0].name, "Jazz");
}

#[tokio::test]
async fn provider_top_tracks_are_merged_and_matched() {
    let app = TestApp::new();
    app.store.add_user(1, "alice", Some("alice@spotify.example"));
    app.store
        .add_token(Provider::Spotify, "alice@spotify.example", "tok-1");
    app.store.set_favorites_blob(
        1,
        r#"[{"id": 300, "name": "Song B", "artist": "Band B", "type": "track"}]"#,
    );

    app.streaming.set_top_tracks(
        "tok-1",
        vec![
            provider_track("Song B", "Band B", "spotify_b1"),
            provider_track("Song C", "Band C", "spotify_c1"),
        ],
    );

    // Catalog matches recover comparable artist/genre ids for the
    // provider tracks
    app.catalog.add_search_result(
        "Band B Song B",
        TrackDetails {
            artist_id: Some("20".to_string()),
            album_id: Some("88".to_string()),
        },
    );
    app.catalog.add_search_result(
        "Band C Song C",
        TrackDetails {
            artist_id: Some("21".to_string()),
            album_id: Some("99".to_string()),
        },
    );
    app.catalog.add_album_genres("88", vec![genre(3, "Pop")]);
    app.catalog.add_album_genres("99", vec![genre(4, "Electro")]);
    app.catalog.add_artist("20", artist(20, "Band B"));
    app.catalog.add_artist("21", artist(21, "Band C"));

    let taste = app.enricher().enrich(&user(1, Some("alice@spotify.example"))).await;

    // "Song B" by "Band B" is already a favorite, so only "Song C" is
    // appended
    assert_eq!(taste.tracks.len(), 2);
    let appended = taste.tracks[1].as_track().expect("appended track");
    assert_eq!(appended.name, "Song C");
    assert_eq!(appended.source.as_deref(), Some("spotify"));

    let artist_names: Vec<&str> = taste.artists.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(artist_names, vec!["Band B", "Band C"]);

    let genre_names: Vec<&str> = taste.genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(genre_names, vec!["Pop", "Electro"]);
}

#[tokio::test]
async fn unparseable_blob_degrades_to_empty_favorites() {
    let app = TestApp::new();
    app.store.add_user(1, "alice", None);
    app.store.set_favorites_blob(1, "{definitely not json");
    app.catalog.set_fallback_genres(vec![genre(1, "Pop")]);

    let taste = app.enricher().enrich(&user(1, None)).await;

    assert!(taste.tracks.is_empty());
    assert_eq!(taste.genres.len(), 1);
}
