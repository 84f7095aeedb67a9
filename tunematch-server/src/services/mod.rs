//! External collaborators and the pipelines built on top of them
//!
//! `StreamingProvider` and `Catalog` are the seams to the external APIs;
//! production wires in the reqwest-backed clients, tests substitute fakes.

pub mod compatibility;
pub mod deezer;
pub mod enrichment;
pub mod spotify;

pub use deezer::DeezerClient;
pub use enrichment::TasteEnricher;
pub use spotify::SpotifyClient;

use thiserror::Error;
use tunematch_common::model::{ArtistSummary, FavoriteTrack, GenreSummary, ListeningInfo};

/// Streaming provider call errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Catalog lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Track identifiers resolved by a catalog lookup.
///
/// Only the ids the enrichment pipeline needs; full track metadata stays
/// with the stored favorite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDetails {
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
}

/// An OAuth-authenticated streaming provider API (now-playing + top tracks).
#[async_trait::async_trait]
pub trait StreamingProvider: Send + Sync {
    /// What the token's owner is listening to right now.
    ///
    /// Returns `Ok(None)` both when nothing is playing and when the provider
    /// denies access; only transport/parse failures surface as errors.
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<ListeningInfo>, ProviderError>;

    /// The token owner's most-played tracks, already mapped to the shared
    /// favorite-track shape (ids prefixed with the provider name).
    async fn top_tracks(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<FavoriteTrack>, ProviderError>;
}

/// External catalog metadata lookups (track/artist/album/genre).
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    async fn track(&self, id: &str) -> Result<TrackDetails, CatalogError>;

    async fn artist(&self, id: &str) -> Result<ArtistSummary, CatalogError>;

    /// Genres attached to an album's metadata.
    async fn album_genres(&self, id: &str) -> Result<Vec<GenreSummary>, CatalogError>;

    /// Globally popular genres, used as the enrichment fallback.
    async fn list_genres(&self) -> Result<Vec<GenreSummary>, CatalogError>;

    /// The artist's current top track, if the catalog knows one.
    async fn artist_top_track(&self, id: &str) -> Result<Option<TrackDetails>, CatalogError>;

    /// Best matching track for a free-text query, if any.
    async fn search_track(&self, query: &str) -> Result<Option<TrackDetails>, CatalogError>;
}
