//! HTTP API surface
//!
//! REST endpoints for taste enrichment and compatibility, the presence
//! hook the auth layer calls on login/logout, and the SSE push channel.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, AppContext};
