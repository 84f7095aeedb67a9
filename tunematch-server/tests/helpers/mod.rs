//! Shared test fixtures: in-memory fakes for the store, the streaming
//! provider, and the catalog, plus a router builder wired with them.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use tunematch_common::db::{AccountStore, StoredAccount, User};
use tunematch_common::model::{
    ArtistSummary, FavoriteTrack, GenreSummary, ListeningInfo, Provider, UserId,
};
use tunematch_common::{Error, Result};
use tunematch_server::api::{create_router, AppContext};
use tunematch_server::registry::PresenceRegistry;
use tunematch_server::services::{
    Catalog, CatalogError, ProviderError, StreamingProvider, TasteEnricher, TrackDetails,
};

// =============================================================================
// Account store fake
// =============================================================================

#[derive(Default)]
pub struct FakeStore {
    users: Mutex<HashMap<UserId, User>>,
    favorites: Mutex<HashMap<UserId, String>>,
    tokens: Mutex<Vec<(Provider, String, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: UserId, username: &str, email_spotify: Option<&str>) {
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                username: username.to_string(),
                email_spotify: email_spotify.map(|e| e.to_string()),
                email_twitch: None,
                email_google: None,
            },
        );
    }

    pub fn set_favorites_blob(&self, id: UserId, blob: &str) {
        self.favorites.lock().unwrap().insert(id, blob.to_string());
    }

    pub fn add_token(&self, provider: Provider, email: &str, token: &str) {
        self.tokens
            .lock()
            .unwrap()
            .push((provider, email.to_string(), token.to_string()));
    }

    pub fn favorites_blob(&self, id: UserId) -> Option<String> {
        self.favorites.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl AccountStore for FakeStore {
    async fn accounts_with_tokens(&self, provider: Provider) -> Result<Vec<StoredAccount>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _, _)| *p == provider)
            .map(|(_, email, token)| StoredAccount {
                identity_email: email.clone(),
                access_token: token.clone(),
            })
            .collect())
    }

    async fn user_by_identity(&self, provider: Provider, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.identity_email(provider) == Some(email))
            .cloned())
    }

    async fn token_for_identity(&self, provider: Provider, email: &str) -> Result<Option<String>> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|(p, e, _)| *p == provider && e == email)
            .map(|(_, _, token)| token.clone()))
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn user_favorites(&self, id: UserId) -> Result<Option<String>> {
        if !self.users.lock().unwrap().contains_key(&id) {
            return Err(Error::NotFound(format!("user {}", id)));
        }
        Ok(self.favorites.lock().unwrap().get(&id).cloned())
    }

    async fn set_user_favorites(&self, id: UserId, blob: &str) -> Result<bool> {
        if !self.users.lock().unwrap().contains_key(&id) {
            return Ok(false);
        }
        self.favorites.lock().unwrap().insert(id, blob.to_string());
        Ok(true)
    }
}

// =============================================================================
// Streaming provider fake
// =============================================================================

/// Per-token behavior of the fake streaming provider.
pub enum TokenBehavior {
    Playing(ListeningInfo),
    Idle,
    Fails,
}

#[derive(Default)]
pub struct FakeStreaming {
    now_playing: Mutex<HashMap<String, TokenBehavior>>,
    top_tracks: Mutex<HashMap<String, Vec<FavoriteTrack>>>,
}

impl FakeStreaming {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_behavior(&self, token: &str, behavior: TokenBehavior) {
        self.now_playing
            .lock()
            .unwrap()
            .insert(token.to_string(), behavior);
    }

    pub fn set_top_tracks(&self, token: &str, tracks: Vec<FavoriteTrack>) {
        self.top_tracks
            .lock()
            .unwrap()
            .insert(token.to_string(), tracks);
    }
}

#[async_trait::async_trait]
impl StreamingProvider for FakeStreaming {
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> std::result::Result<Option<ListeningInfo>, ProviderError> {
        match self.now_playing.lock().unwrap().get(access_token) {
            Some(TokenBehavior::Playing(info)) => Ok(Some(info.clone())),
            Some(TokenBehavior::Idle) | None => Ok(None),
            Some(TokenBehavior::Fails) => {
                Err(ProviderError::Network("connection refused".to_string()))
            }
        }
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        _limit: usize,
    ) -> std::result::Result<Vec<FavoriteTrack>, ProviderError> {
        Ok(self
            .top_tracks
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// Catalog fake
// =============================================================================

#[derive(Default)]
pub struct FakeCatalog {
    tracks: Mutex<HashMap<String, TrackDetails>>,
    failing_tracks: Mutex<Vec<String>>,
    artists: Mutex<HashMap<String, ArtistSummary>>,
    album_genres: Mutex<HashMap<String, Vec<GenreSummary>>>,
    fallback_genres: Mutex<Vec<GenreSummary>>,
    artist_top_tracks: Mutex<HashMap<String, TrackDetails>>,
    searches: Mutex<HashMap<String, TrackDetails>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_track(&self, id: &str, details: TrackDetails) {
        self.tracks.lock().unwrap().insert(id.to_string(), details);
    }

    /// Make the next lookups of this track id fail at the network level.
    pub fn fail_track(&self, id: &str) {
        self.failing_tracks.lock().unwrap().push(id.to_string());
    }

    pub fn add_artist(&self, id: &str, summary: ArtistSummary) {
        self.artists.lock().unwrap().insert(id.to_string(), summary);
    }

    pub fn add_album_genres(&self, album_id: &str, genres: Vec<GenreSummary>) {
        self.album_genres
            .lock()
            .unwrap()
            .insert(album_id.to_string(), genres);
    }

    pub fn set_fallback_genres(&self, genres: Vec<GenreSummary>) {
        *self.fallback_genres.lock().unwrap() = genres;
    }

    pub fn add_artist_top_track(&self, artist_id: &str, details: TrackDetails) {
        self.artist_top_tracks
            .lock()
            .unwrap()
            .insert(artist_id.to_string(), details);
    }

    pub fn add_search_result(&self, query: &str, details: TrackDetails) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), details);
    }
}

#[async_trait::async_trait]
impl Catalog for FakeCatalog {
    async fn track(&self, id: &str) -> std::result::Result<TrackDetails, CatalogError> {
        if self.failing_tracks.lock().unwrap().iter().any(|t| t == id) {
            return Err(CatalogError::Network("connection reset".to_string()));
        }
        // Unknown ids resolve to empty details, like a catalog error body
        Ok(self
            .tracks
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn artist(&self, id: &str) -> std::result::Result<ArtistSummary, CatalogError> {
        self.artists
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Api(404, format!("no artist {}", id)))
    }

    async fn album_genres(&self, id: &str) -> std::result::Result<Vec<GenreSummary>, CatalogError> {
        Ok(self
            .album_genres
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_genres(&self) -> std::result::Result<Vec<GenreSummary>, CatalogError> {
        Ok(self.fallback_genres.lock().unwrap().clone())
    }

    async fn artist_top_track(
        &self,
        id: &str,
    ) -> std::result::Result<Option<TrackDetails>, CatalogError> {
        Ok(self.artist_top_tracks.lock().unwrap().get(id).cloned())
    }

    async fn search_track(
        &self,
        query: &str,
    ) -> std::result::Result<Option<TrackDetails>, CatalogError> {
        Ok(self.searches.lock().unwrap().get(query).cloned())
    }
}

// =============================================================================
// Construction helpers
// =============================================================================

pub fn genre(id: u64, name: &str) -> GenreSummary {
    GenreSummary {
        id,
        name: name.to_string(),
        picture: None,
    }
}

pub fn artist(id: u64, name: &str) -> ArtistSummary {
    ArtistSummary {
        id,
        name: name.to_string(),
        picture: None,
    }
}

pub fn listening(track: &str) -> ListeningInfo {
    ListeningInfo {
        service: "spotify".to_string(),
        track_name: track.to_string(),
        artists: "Artist".to_string(),
        album: "Album".to_string(),
        track_url: "https://example.com".to_string(),
    }
}

pub struct TestApp {
    pub store: Arc<FakeStore>,
    pub catalog: Arc<FakeCatalog>,
    pub streaming: Arc<FakeStreaming>,
    pub registry: Arc<PresenceRegistry>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: Arc::new(FakeStore::new()),
            catalog: Arc::new(FakeCatalog::new()),
            streaming: Arc::new(FakeStreaming::new()),
            registry: Arc::new(PresenceRegistry::new(16)),
        }
    }

    pub fn enricher(&self) -> Arc<TasteEnricher> {
        Arc::new(TasteEnricher::new(
            self.store.clone(),
            self.catalog.clone(),
            self.streaming.clone(),
        ))
    }

    pub fn router(&self) -> Router {
        let ctx = AppContext {
            registry: self.registry.clone(),
            store: self.store.clone(),
            enricher: self.enricher(),
        };
        create_router(ctx)
    }
}
