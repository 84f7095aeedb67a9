//! Deezer catalog API client
//!
//! Track/artist/album/genre metadata lookups backing the taste enrichment
//! pipeline. Deezer reports bad ids as a 200 with an `error` body; those
//! parse into empty optional fields and simply contribute nothing.

use super::{Catalog, CatalogError, TrackDetails};
use serde::Deserialize;
use std::time::Duration;
use tunematch_common::model::{ArtistSummary, GenreSummary};

const DEEZER_BASE_URL: &str = "https://api.deezer.com";

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    artist: Option<DeezerArtistRef>,
    album: Option<DeezerAlbumRef>,
}

#[derive(Debug, Deserialize)]
struct DeezerArtistRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbumRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    id: u64,
    name: String,
    picture: Option<String>,
    picture_medium: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeezerAlbum {
    genres: Option<DeezerGenreList>,
}

#[derive(Debug, Deserialize)]
struct DeezerGenreList {
    #[serde(default)]
    data: Vec<DeezerGenre>,
}

#[derive(Debug, Deserialize)]
struct DeezerGenre {
    id: u64,
    name: String,
    picture: Option<String>,
    picture_medium: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeezerList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl From<DeezerGenre> for GenreSummary {
    fn from(genre: DeezerGenre) -> Self {
        GenreSummary {
            id: genre.id,
            name: genre.name,
            picture: genre.picture_medium.or(genre.picture),
        }
    }
}

/// Deezer catalog client with a bounded per-call timeout.
pub struct DeezerClient {
    http_client: reqwest::Client,
}

impl DeezerClient {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", DEEZER_BASE_URL, path);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Catalog for DeezerClient {
    async fn track(&self, id: &str) -> Result<TrackDetails, CatalogError> {
        let track: DeezerTrack = self.get_json(&format!("/track/{}", id), &[]).await?;
        Ok(TrackDetails {
            artist_id: track.artist.map(|a| a.id.to_string()),
            album_id: track.album.map(|a| a.id.to_string()),
        })
    }

    async fn artist(&self, id: &str) -> Result<ArtistSummary, CatalogError> {
        let artist: DeezerArtist = self.get_json(&format!("/artist/{}", id), &[]).await?;
        Ok(ArtistSummary {
            id: artist.id,
            name: artist.name,
            picture: artist.picture_medium.or(artist.picture),
        })
    }

    async fn album_genres(&self, id: &str) -> Result<Vec<GenreSummary>, CatalogError> {
        let album: DeezerAlbum = self.get_json(&format!("/album/{}", id), &[]).await?;
        Ok(album
            .genres
            .map(|g| g.data.into_iter().map(GenreSummary::from).collect())
            .unwrap_or_default())
    }

    async fn list_genres(&self) -> Result<Vec<GenreSummary>, CatalogError> {
        let genres: DeezerList<DeezerGenre> = self.get_json("/genre", &[]).await?;
        Ok(genres.data.into_iter().map(GenreSummary::from).collect())
    }

    async fn artist_top_track(&self, id: &str) -> Result<Option<TrackDetails>, CatalogError> {
        let top: DeezerList<DeezerTrack> = self
            .get_json(&format!("/artist/{}/top", id), &[("limit", "1")])
            .await?;
        Ok(top.data.into_iter().next().map(|track| TrackDetails {
            artist_id: track.artist.map(|a| a.id.to_string()),
            album_id: track.album.map(|a| a.id.to_string()),
        }))
    }

    async fn search_track(&self, query: &str) -> Result<Option<TrackDetails>, CatalogError> {
        let results: DeezerList<DeezerTrack> = self
            .get_json("/search/track", &[("q", query), ("limit", "1")])
            .await?;
        Ok(results.data.into_iter().next().map(|track| TrackDetails {
            artist_id: track.artist.map(|a| a.id.to_string()),
            album_id: track.album.map(|a| a.id.to_string()),
        }))
    }
}
