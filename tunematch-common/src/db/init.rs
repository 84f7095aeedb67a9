//! Database initialization and schema creation

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open (or create) the SQLite database and ensure the schema exists.
pub async fn init_db(path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    info!("Account store ready at {}", path.display());

    Ok(pool)
}

/// Create tables if they don't exist.
///
/// `favorite_selections` is an opaque JSON blob owned by the client; the
/// core only reads and parses it with parse-or-default semantics.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            email_spotify TEXT,
            email_twitch TEXT,
            email_google TEXT,
            position TEXT,
            date_born TEXT,
            is_admin INTEGER NOT NULL DEFAULT 0,
            favorite_selections TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tokens (
            provider TEXT NOT NULL,
            identity_email TEXT NOT NULL,
            token TEXT NOT NULL,
            PRIMARY KEY (provider, identity_email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
