//! # TuneMatch Server
//!
//! Presence & compatibility service: keeps a live registry of who is online
//! and what they are listening to, fans registry snapshots out to real-time
//! subscribers, and computes taste compatibility between users from their
//! favorite tracks.

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod registry;
pub mod services;

pub use error::{Error, Result};
