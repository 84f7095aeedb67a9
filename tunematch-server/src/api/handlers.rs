//! HTTP request handlers

use crate::api::server::AppContext;
use crate::services::compatibility;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tunematch_common::db::User;
use tunematch_common::model::{CompatibilityResult, EnrichedTaste, FavoriteItem, UserId};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    online: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetFavoritesRequest {
    favorites: Vec<serde_json::Value>,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

fn not_found(what: impl Into<String>) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse {
            status: what.into(),
        }),
    )
}

fn bad_request(reason: impl Into<String>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(StatusResponse {
            status: reason.into(),
        }),
    )
}

fn internal_error(e: impl std::fmt::Display) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusResponse {
            status: format!("error: {}", e),
        }),
    )
}

/// Look up a user or produce the 404/500 response for the caller.
async fn require_user(ctx: &AppContext, id: UserId) -> Result<User, HandlerError> {
    match ctx.store.user_by_id(id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(not_found(format!("user {} not found", id))),
        Err(e) => {
            error!(user_id = id, "User lookup failed: {}", e);
            Err(internal_error(e))
        }
    }
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "tunematch_server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Favorites & Enrichment Endpoints
// ============================================================================

/// GET /users/:id/favorites - Enriched taste profile for one user
///
/// Always succeeds for a known user: missing or malformed stored favorites
/// yield empty tracks/artists and fallback genres.
pub async fn get_favorites(
    State(ctx): State<AppContext>,
    Path(id): Path<UserId>,
) -> Result<Json<EnrichedTaste>, HandlerError> {
    let user = require_user(&ctx, id).await?;
    let taste = ctx.enricher.enrich(&user).await;
    Ok(Json(taste))
}

/// POST /users/:id/favorites - Replace the stored favorites list
///
/// Accepts free-form tag strings and structured track objects; anything
/// else is rejected before it can poison the stored blob.
pub async fn set_favorites(
    State(ctx): State<AppContext>,
    Path(id): Path<UserId>,
    Json(req): Json<SetFavoritesRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    let mut items: Vec<FavoriteItem> = Vec::with_capacity(req.favorites.len());
    for value in req.favorites {
        let item: FavoriteItem = serde_json::from_value(value).map_err(|_| {
            bad_request("each favorite must be a tag string or a music item with id, name, artist and type")
        })?;
        if let Some(track) = item.as_track() {
            if track.name.trim().is_empty() || track.artist.trim().is_empty() {
                return Err(bad_request("favorite tracks need a non-empty name and artist"));
            }
        }
        items.push(item);
    }

    let blob = serde_json::to_string(&items).map_err(internal_error)?;

    match ctx.store.set_user_favorites(id, &blob).await {
        Ok(true) => {
            info!(user_id = id, count = items.len(), "favorites updated");
            Ok(Json(StatusResponse {
                status: "favorites updated".to_string(),
            }))
        }
        Ok(false) => Err(not_found(format!("user {} not found", id))),
        Err(e) => {
            error!(user_id = id, "Failed to store favorites: {}", e);
            Err(internal_error(e))
        }
    }
}

/// GET /users/compatibility/:id1/:id2 - Music compatibility between users
pub async fn get_compatibility(
    State(ctx): State<AppContext>,
    Path((id1, id2)): Path<(UserId, UserId)>,
) -> Result<Json<CompatibilityResult>, HandlerError> {
    // Comparing a user with themself needs no enrichment at all
    if id1 == id2 {
        return Ok(Json(compatibility::self_match()));
    }

    let user1 = require_user(&ctx, id1).await?;
    let user2 = require_user(&ctx, id2).await?;

    let (taste1, taste2) = tokio::join!(ctx.enricher.enrich(&user1), ctx.enricher.enrich(&user2));

    Ok(Json(compatibility::score(&taste1, &taste2)))
}

// ============================================================================
// Presence Endpoint
// ============================================================================

/// POST /users/:id/presence - Flip a user's online flag
///
/// Called by the auth layer on login/logout; listening info is left
/// untouched so a returning user keeps their last-known track.
pub async fn set_presence(
    State(ctx): State<AppContext>,
    Path(id): Path<UserId>,
    Json(req): Json<PresenceRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    require_user(&ctx, id).await?;

    ctx.registry.set_online(id, req.online);
    info!(user_id = id, online = req.online, "presence updated");

    Ok(Json(StatusResponse {
        status: "presence updated".to_string(),
    }))
}
