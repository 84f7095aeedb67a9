//! Core data model shared by the presence and compatibility components
//!
//! Field names serialize in camelCase to match the wire format the
//! real-time and REST clients consume.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Opaque stable user identifier, assigned by the account store.
pub type UserId = i64;

/// Streaming/identity providers a user account can be linked to.
///
/// Only Spotify exposes a "currently playing" endpoint today; the other
/// providers are identity-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Spotify,
    Google,
    Twitch,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Spotify => "spotify",
            Provider::Google => "google",
            Provider::Twitch => "twitch",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a user is currently listening to, as reported by a provider.
///
/// No history is retained; each poller refresh overwrites the previous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningInfo {
    /// Provider that reported the activity (e.g. "spotify")
    pub service: String,
    pub track_name: String,
    /// All credited artists, joined with ", "
    pub artists: String,
    pub album: String,
    pub track_url: String,
}

/// One user's entry in the presence registry.
///
/// `online` and `listening` change independently: a user who logs out keeps
/// their last-known listening info until it is overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub online: bool,
    pub listening: Option<ListeningInfo>,
}

/// A raw stored favorite: either a free-form tag (legacy format) or a
/// structured track reference from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FavoriteItem {
    Track(FavoriteTrack),
    Tag(String),
}

impl FavoriteItem {
    pub fn as_track(&self) -> Option<&FavoriteTrack> {
        match self {
            FavoriteItem::Track(t) => Some(t),
            FavoriteItem::Tag(_) => None,
        }
    }
}

/// Structured favorite track reference.
///
/// Ids are kept as strings: catalog ids arrive as JSON numbers while
/// provider-merged tracks carry prefixed string ids (e.g. "spotify_..."),
/// and the two are never comparable numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTrack {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub artist: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    /// Set to the provider name when the track was merged from a linked
    /// streaming account rather than picked by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Artist metadata resolved from the catalog, deduplicated by catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    pub id: u64,
    pub name: String,
    pub picture: Option<String>,
}

/// Genre metadata resolved from the catalog, deduplicated by catalog id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreSummary {
    pub id: u64,
    pub name: String,
    pub picture: Option<String>,
}

/// Derived taste profile for one user. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTaste {
    pub tracks: Vec<FavoriteItem>,
    pub artists: Vec<ArtistSummary>,
    pub genres: Vec<GenreSummary>,
}

/// Similarity verdict between two users. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    /// Bounded to 0..=100
    pub score: u8,
    pub match_level: String,
    pub common_artists: Vec<String>,
    pub common_genres: Vec<String>,
}

/// Parse a stored favorites blob with parse-or-default semantics.
///
/// A missing blob, invalid JSON, or a non-array payload all yield an empty
/// list; malformed favorites are never surfaced as an error.
pub fn parse_favorites(blob: Option<&str>) -> Vec<FavoriteItem> {
    let Some(blob) = blob else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<FavoriteItem>>(blob) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Ignoring unparseable favorites blob: {}", e);
            Vec::new()
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a string or numeric id")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    let opt = Option::<Wrapper>::deserialize(deserializer)?;
    Ok(opt.map(|w| w.0))
}
