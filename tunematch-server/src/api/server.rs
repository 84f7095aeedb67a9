//! HTTP server setup and routing

use super::{handlers, sse};
use crate::registry::PresenceRegistry;
use crate::services::TasteEnricher;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tunematch_common::db::AccountStore;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub registry: Arc<PresenceRegistry>,
    pub store: Arc<dyn AccountStore>,
    pub enricher: Arc<TasteEnricher>,
}

/// Build the application router with all routes.
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health))
        // SSE push channel
        .route("/events", get(sse::event_stream))
        // Taste enrichment and compatibility
        .route("/users/:id/favorites", get(handlers::get_favorites))
        .route("/users/:id/favorites", post(handlers::set_favorites))
        .route(
            "/users/compatibility/:id1/:id2",
            get(handlers::get_compatibility),
        )
        // Presence hook called by the auth layer on login/logout
        .route("/users/:id/presence", post(handlers::set_presence))
        // Attach application context
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
        // Request/response logging, filtered via the tower_http directive
        .layer(TraceLayer::new_for_http())
}
