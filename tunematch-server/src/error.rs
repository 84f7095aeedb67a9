//! Error types for tunematch-server
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation.

use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from the shared library (store, model, validation)
    #[error(transparent)]
    Common(#[from] tunematch_common::Error),

    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience Result type using the server Error
pub type Result<T> = std::result::Result<T, Error>;
