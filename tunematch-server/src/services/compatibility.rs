//! Compatibility scorer
//!
//! Deterministic, bounded similarity score between two users' enriched
//! tastes. The weights and thresholds are part of the observable contract
//! and must not be tuned casually.

use rand::seq::SliceRandom;
use tunematch_common::model::{CompatibilityResult, EnrichedTaste};

/// Base score every comparison starts from.
const BASE_SCORE: i64 = 30;

/// Maximum points contributed by artist overlap.
const ARTIST_WEIGHT: f64 = 30.0;

/// Maximum points contributed by genre overlap (genres represent broader
/// tastes, so they weigh more).
const GENRE_WEIGHT: f64 = 40.0;

/// Bonus per exact common track, capped.
const TRACK_BONUS_PER_MATCH: i64 = 2;
const TRACK_BONUS_CAP: i64 = 10;

/// Placeholder names substituted when no real overlap exists, so the
/// response is never empty. Clearly fake data, never blended with real
/// overlap results.
const POPULAR_ARTISTS: &[&str] = &[
    "The Weeknd",
    "Dua Lipa",
    "Bad Bunny",
    "Taylor Swift",
    "Billie Eilish",
];

const POPULAR_GENRES: &[&str] = &["Pop", "Rock", "Hip-Hop", "R&B", "Electronic", "Latin"];

/// Fast path for comparing a user with themself.
pub fn self_match() -> CompatibilityResult {
    CompatibilityResult {
        score: 100,
        match_level: match_level(100).to_string(),
        common_artists: Vec::new(),
        common_genres: Vec::new(),
    }
}

/// Score two enriched tastes against each other.
///
/// Pure given its inputs, aside from the documented random sampling used
/// when a common-artist/genre list would otherwise be empty.
pub fn score(user1: &EnrichedTaste, user2: &EnrichedTaste) -> CompatibilityResult {
    let user1_artist_ids: Vec<u64> = user1.artists.iter().map(|a| a.id).collect();
    let user2_artist_ids: Vec<u64> = user2.artists.iter().map(|a| a.id).collect();
    let user1_genre_ids: Vec<u64> = user1.genres.iter().map(|g| g.id).collect();
    let user2_genre_ids: Vec<u64> = user2.genres.iter().map(|g| g.id).collect();

    let common_artist_ids: Vec<u64> = user1_artist_ids
        .iter()
        .filter(|id| user2_artist_ids.contains(id))
        .copied()
        .collect();
    let common_genre_ids: Vec<u64> = user1_genre_ids
        .iter()
        .filter(|id| user2_genre_ids.contains(id))
        .copied()
        .collect();

    let mut score = BASE_SCORE;
    score += (overlap(common_artist_ids.len(), &user1_artist_ids, &user2_artist_ids)
        * ARTIST_WEIGHT)
        .round() as i64;
    score += (overlap(common_genre_ids.len(), &user1_genre_ids, &user2_genre_ids) * GENRE_WEIGHT)
        .round() as i64;

    // Exact track matches earn a capped bonus
    let user1_track_ids: Vec<&str> = track_ids(user1);
    let user2_track_ids: Vec<&str> = track_ids(user2);
    let common_tracks = user1_track_ids
        .iter()
        .filter(|id| user2_track_ids.contains(id))
        .count() as i64;
    if common_tracks > 0 {
        score += (common_tracks * TRACK_BONUS_PER_MATCH).min(TRACK_BONUS_CAP);
    }

    // Don't report near-zero compatibility purely from rounding when both
    // sides do have some data
    let user1_has_data = !user1_artist_ids.is_empty() || !user1_genre_ids.is_empty();
    let user2_has_data = !user2_artist_ids.is_empty() || !user2_genre_ids.is_empty();
    if score < 20 && user1_has_data && user2_has_data {
        score = 20;
    }

    let score = score.clamp(0, 100) as u8;

    let common_artists: Vec<String> = user1
        .artists
        .iter()
        .filter(|a| common_artist_ids.contains(&a.id))
        .map(|a| a.name.clone())
        .collect();
    let common_genres: Vec<String> = user1
        .genres
        .iter()
        .filter(|g| common_genre_ids.contains(&g.id))
        .map(|g| g.name.clone())
        .collect();

    CompatibilityResult {
        score,
        match_level: match_level(score).to_string(),
        common_artists: non_empty_or_sample(common_artists, POPULAR_ARTISTS),
        common_genres: non_empty_or_sample(common_genres, POPULAR_GENRES),
    }
}

/// `|common| / min(|a|, |b|)`, or 0 when either side is empty.
fn overlap(common: usize, a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    common as f64 / a.len().min(b.len()) as f64
}

fn track_ids(taste: &EnrichedTaste) -> Vec<&str> {
    taste
        .tracks
        .iter()
        .filter_map(|item| item.as_track())
        .map(|t| t.id.as_str())
        .collect()
}

/// Map a bounded score to its descriptive label.
pub fn match_level(score: u8) -> &'static str {
    match score {
        90..=u8::MAX => "Perfect Match!",
        80..=89 => "Musical Twins",
        70..=79 => "Great Match",
        60..=69 => "Good Match",
        50..=59 => "Decent Match",
        40..=49 => "Some Similarities",
        30..=39 => "Different Tastes",
        _ => "Musical Opposites",
    }
}

/// Substitute a random 2-sample of placeholder names for an empty list.
fn non_empty_or_sample(names: Vec<String>, pool: &[&str]) -> Vec<String> {
    if !names.is_empty() {
        return names;
    }
    let mut rng = rand::thread_rng();
    pool.choose_multiple(&mut rng, 2)
        .map(|s| s.to_string())
        .collect()
}
