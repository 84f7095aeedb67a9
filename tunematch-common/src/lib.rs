//! # TuneMatch Common Library
//!
//! Shared code for the TuneMatch services including:
//! - Data model (presence, favorites, enriched taste, compatibility)
//! - Push event types broadcast to real-time subscribers
//! - Account store access (users, provider tokens, favorites blobs)
//! - Common error types

pub mod db;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
