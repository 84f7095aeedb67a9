//! Configuration loading and database path resolution

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Reference polling cadence for listening-status refresh.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Bounded timeout applied to every external provider/catalog call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(port: u16, database: PathBuf) -> Self {
        Self {
            port,
            database,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`tunematch.toml` in the working directory)
/// 4. Compiled default (`tunematch.db`)
pub fn resolve_database_path(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    let config_path = PathBuf::from("tunematch.toml");
    if config_path.exists() {
        let toml_content = std::fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", config_path.display(), e)))?;
        let config = toml::from_str::<toml::Value>(&toml_content)
            .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?;
        if let Some(database) = config.get("database").and_then(|v| v.as_str()) {
            return Ok(PathBuf::from(database));
        }
    }

    // Priority 4: Compiled default
    Ok(PathBuf::from("tunematch.db"))
}
