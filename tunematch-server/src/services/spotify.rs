//! Spotify Web API client
//!
//! Implements the now-playing lookup the poller runs every tick and the
//! top-tracks fetch the enrichment pipeline merges into a user's favorites.

use super::{ProviderError, StreamingProvider};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use tunematch_common::model::{FavoriteTrack, ListeningInfo};

const SPOTIFY_BASE_URL: &str = "https://api.spotify.com/v1";

/// Currently-playing response (only the fields we consume)
#[derive(Debug, Deserialize)]
struct CurrentlyPlayingResponse {
    item: Option<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: String,
    name: String,
    artists: Vec<SpotifyArtist>,
    album: SpotifyAlbum,
    #[serde(default)]
    external_urls: SpotifyExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SpotifyExternalUrls {
    spotify: Option<String>,
}

/// Spotify Web API client with a bounded per-call timeout.
pub struct SpotifyClient {
    http_client: reqwest::Client,
}

impl SpotifyClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait::async_trait]
impl StreamingProvider for SpotifyClient {
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<ListeningInfo>, ProviderError> {
        let url = format!("{}/me/player/currently-playing", SPOTIFY_BASE_URL);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        // Expired tokens and closed players are routine, not failures:
        // both simply mean "nothing to report".
        if !status.is_success() {
            debug!(status = status.as_u16(), "no currently-playing data");
            return Ok(None);
        }

        // Spotify answers 204 with an empty body when the player is idle
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: CurrentlyPlayingResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parsed.item.map(|item| ListeningInfo {
            service: "spotify".to_string(),
            track_name: item.name,
            artists: item
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            album: item.album.name,
            track_url: item.external_urls.spotify.unwrap_or_default(),
        }))
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<FavoriteTrack>, ProviderError> {
        let url = format!("{}/me/top/tracks?limit={}", SPOTIFY_BASE_URL, limit);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let parsed: TopTracksResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parsed.items.into_iter().map(to_favorite_track).collect())
    }
}

/// Map a Spotify track into the shared favorite-track shape.
///
/// The id is prefixed so it can never collide with (or compare equal to) a
/// catalog id; cross-provider dedup happens by (name, artist) instead.
fn to_favorite_track(track: SpotifyTrack) -> FavoriteTrack {
    let (artist, artist_id) = track
        .artists
        .first()
        .map(|a| (a.name.clone(), Some(a.id.clone())))
        .unwrap_or_else(|| (String::new(), None));

    // Prefer the mid-size image, matching the catalog's picture sizing
    let image_url = track
        .album
        .images
        .get(1)
        .or_else(|| track.album.images.first())
        .map(|i| i.url.clone());

    FavoriteTrack {
        id: format!("spotify_{}", track.id),
        name: track.name,
        artist,
        artist_id,
        album_name: Some(track.album.name),
        album_id: Some(track.album.id),
        image_url,
        item_type: "track".to_string(),
        source: Some("spotify".to_string()),
    }
}
