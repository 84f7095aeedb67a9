//! Taste enrichment pipeline
//!
//! Turns a user's stored favorites (free-form tags and/or structured track
//! references) into an `EnrichedTaste` by resolving missing identifiers and
//! collecting artist/genre metadata from the external catalog.
//!
//! Every external call is individually fenced: a failed lookup logs and
//! contributes nothing, and the overall result is always produced.

use super::{Catalog, StreamingProvider};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};
use tunematch_common::db::{AccountStore, User};
use tunematch_common::model::{
    parse_favorites, ArtistSummary, EnrichedTaste, FavoriteItem, FavoriteTrack, GenreSummary,
    Provider,
};

/// At most this many genres are returned, preferring genres discovered from
/// the user's own favorites over fallback entries.
const GENRE_CAP: usize = 10;

/// How many provider top tracks to merge into the favorites list.
const TOP_TRACKS_LIMIT: usize = 10;

/// Per-track catalog findings, applied back onto the favorites list after
/// the concurrent lookups join.
struct TrackEnrichment {
    index: usize,
    artist_id: Option<String>,
    album_id: Option<String>,
    genres: Vec<GenreSummary>,
}

/// Expands raw favorites into artist and genre feature sets.
pub struct TasteEnricher {
    store: Arc<dyn AccountStore>,
    catalog: Arc<dyn Catalog>,
    streaming: Arc<dyn StreamingProvider>,
}

impl TasteEnricher {
    pub fn new(
        store: Arc<dyn AccountStore>,
        catalog: Arc<dyn Catalog>,
        streaming: Arc<dyn StreamingProvider>,
    ) -> Self {
        Self {
            store,
            catalog,
            streaming,
        }
    }

    /// Build the enriched taste profile for one user.
    ///
    /// Infallible by design: missing or malformed favorites become an empty
    /// list, and per-item lookup failures degrade to "contributes nothing".
    pub async fn enrich(&self, user: &User) -> EnrichedTaste {
        let blob = match self.store.user_favorites(user.id).await {
            Ok(blob) => blob,
            Err(e) => {
                error!(user_id = user.id, "Failed to read stored favorites: {}", e);
                None
            }
        };
        let mut items = parse_favorites(blob.as_deref());

        // Resolve missing ids and album genres for catalog-native tracks,
        // all lookups in flight at once
        let lookups = items.iter().enumerate().filter_map(|(index, item)| {
            let track = item.as_track()?;
            // Provider-merged ids are not catalog ids; they are matched by
            // search below instead
            if track.id.contains('_') {
                return None;
            }
            Some(self.enrich_track(index, track.id.clone(), track.album_id.clone()))
        });
        let track_results = join_all(lookups).await;

        let mut genres: Vec<GenreSummary> = Vec::new();
        let mut seen_genres: HashSet<u64> = HashSet::new();
        for result in track_results {
            if let Some(FavoriteItem::Track(track)) = items.get_mut(result.index) {
                if track.artist_id.is_none() {
                    track.artist_id = result.artist_id;
                }
                if track.album_id.is_none() {
                    track.album_id = result.album_id;
                }
            }
            push_unique_genres(&mut genres, &mut seen_genres, result.genres);
        }

        // Top tracks from a linked streaming account, matched against the
        // catalog to recover comparable artist/genre ids
        let provider_tracks = self.provider_top_tracks(user).await;
        let matches = join_all(
            provider_tracks
                .iter()
                .map(|track| self.match_provider_track(track)),
        )
        .await;

        let mut artist_ids: Vec<String> = Vec::new();
        let mut seen_artists: HashSet<String> = HashSet::new();
        for item in &items {
            if let Some(id) = item.as_track().and_then(|t| t.artist_id.clone()) {
                if seen_artists.insert(id.clone()) {
                    artist_ids.push(id);
                }
            }
        }
        for (artist_id, matched_genres) in matches {
            if let Some(id) = artist_id {
                if seen_artists.insert(id.clone()) {
                    artist_ids.push(id);
                }
            }
            push_unique_genres(&mut genres, &mut seen_genres, matched_genres);
        }

        // Artist details plus genre discovery via each artist's top track
        let artist_results = join_all(artist_ids.iter().map(|id| self.fetch_artist(id))).await;

        let mut artists: Vec<ArtistSummary> = Vec::new();
        let mut seen_artist_ids: HashSet<u64> = HashSet::new();
        for (summary, artist_genres) in artist_results {
            if let Some(summary) = summary {
                if seen_artist_ids.insert(summary.id) {
                    artists.push(summary);
                }
            }
            push_unique_genres(&mut genres, &mut seen_genres, artist_genres);
        }

        // Fallback so a downstream compatibility computation never runs on
        // an empty genre set
        if genres.is_empty() {
            match self.catalog.list_genres().await {
                Ok(fallback) => {
                    debug!(count = fallback.len(), "using fallback popular genres");
                    push_unique_genres(&mut genres, &mut seen_genres, fallback);
                }
                Err(e) => warn!("Fallback genre lookup failed: {}", e),
            }
        }
        genres.truncate(GENRE_CAP);

        merge_provider_tracks(&mut items, provider_tracks);

        EnrichedTaste {
            tracks: items,
            artists,
            genres,
        }
    }

    async fn enrich_track(
        &self,
        index: usize,
        track_id: String,
        stored_album_id: Option<String>,
    ) -> TrackEnrichment {
        let mut enrichment = TrackEnrichment {
            index,
            artist_id: None,
            album_id: None,
            genres: Vec::new(),
        };

        match self.catalog.track(&track_id).await {
            Ok(details) => {
                enrichment.artist_id = details.artist_id;
                enrichment.album_id = details.album_id;
            }
            Err(e) => {
                warn!(track_id = %track_id, "Track lookup failed: {}", e);
            }
        }

        let album_id = stored_album_id.or_else(|| enrichment.album_id.clone());
        if let Some(album_id) = album_id {
            match self.catalog.album_genres(&album_id).await {
                Ok(album_genres) => enrichment.genres = album_genres,
                Err(e) => warn!(album_id = %album_id, "Album lookup failed: {}", e),
            }
        }

        enrichment
    }

    /// Top tracks for the user's linked streaming account, or empty when no
    /// account/token exists or the provider call fails.
    async fn provider_top_tracks(&self, user: &User) -> Vec<FavoriteTrack> {
        let Some(email) = user.identity_email(Provider::Spotify) else {
            return Vec::new();
        };

        let token = match self.store.token_for_identity(Provider::Spotify, email).await {
            Ok(Some(token)) => token,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!(user_id = user.id, "Token lookup failed: {}", e);
                return Vec::new();
            }
        };

        match self.streaming.top_tracks(&token, TOP_TRACKS_LIMIT).await {
            Ok(tracks) => {
                debug!(user_id = user.id, count = tracks.len(), "fetched provider top tracks");
                tracks
            }
            Err(e) => {
                warn!(user_id = user.id, "Top tracks fetch failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Find a provider track in the catalog to recover comparable ids.
    async fn match_provider_track(
        &self,
        track: &FavoriteTrack,
    ) -> (Option<String>, Vec<GenreSummary>) {
        let query = format!("{} {}", track.artist, track.name);
        let details = match self.catalog.search_track(&query).await {
            Ok(Some(details)) => details,
            Ok(None) => return (None, Vec::new()),
            Err(e) => {
                warn!(track = %track.name, "Catalog match failed: {}", e);
                return (None, Vec::new());
            }
        };

        let genres = match &details.album_id {
            Some(album_id) => match self.catalog.album_genres(album_id).await {
                Ok(genres) => genres,
                Err(e) => {
                    warn!(album_id = %album_id, "Album lookup failed: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        (details.artist_id, genres)
    }

    /// Artist details plus genres reachable through the artist's top track.
    async fn fetch_artist(&self, id: &str) -> (Option<ArtistSummary>, Vec<GenreSummary>) {
        let summary = match self.catalog.artist(id).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(artist_id = %id, "Artist lookup failed: {}", e);
                return (None, Vec::new());
            }
        };

        let mut genres = Vec::new();
        match self.catalog.artist_top_track(id).await {
            Ok(Some(top)) => {
                if let Some(album_id) = top.album_id {
                    match self.catalog.album_genres(&album_id).await {
                        Ok(album_genres) => genres = album_genres,
                        Err(e) => warn!(album_id = %album_id, "Album lookup failed: {}", e),
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(artist_id = %id, "Top track lookup failed: {}", e),
        }

        (Some(summary), genres)
    }
}

fn push_unique_genres(
    genres: &mut Vec<GenreSummary>,
    seen: &mut HashSet<u64>,
    new: Vec<GenreSummary>,
) {
    for genre in new {
        if seen.insert(genre.id) {
            genres.push(genre);
        }
    }
}

/// Append provider tracks that are not already present, comparing by
/// (track name, artist name) since ids are not comparable across providers.
fn merge_provider_tracks(items: &mut Vec<FavoriteItem>, provider_tracks: Vec<FavoriteTrack>) {
    for track in provider_tracks {
        let duplicate = items.iter().any(|item| {
            item.as_track()
                .map(|t| t.name == track.name && t.artist == track.artist)
                .unwrap_or(false)
        });
        if !duplicate {
            items.push(FavoriteItem::Track(track));
        }
    }
}
