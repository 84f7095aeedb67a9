//! Common error types for TuneMatch

use thiserror::Error;

/// Common result type for TuneMatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TuneMatch services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
