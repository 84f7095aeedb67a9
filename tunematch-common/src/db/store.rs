//! Account store accessors
//!
//! `AccountStore` is the seam between the presence/compatibility core and
//! the relational store; tests substitute an in-memory fake, production
//! uses [`SqliteAccountStore`].

use crate::model::{Provider, UserId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A user record as stored by the account store.
///
/// Provider emails double as the identity linking a stored token back to
/// its owning user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email_spotify: Option<String>,
    pub email_twitch: Option<String>,
    pub email_google: Option<String>,
}

impl User {
    /// The identity email this user has linked for the given provider.
    pub fn identity_email(&self, provider: Provider) -> Option<&str> {
        let email = match provider {
            Provider::Spotify => &self.email_spotify,
            Provider::Twitch => &self.email_twitch,
            Provider::Google => &self.email_google,
        };
        email.as_deref().filter(|e| !e.is_empty())
    }
}

/// Fields required to create a user record (used by the auth layer and tests).
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email_spotify: Option<String>,
    pub email_twitch: Option<String>,
    pub email_google: Option<String>,
}

/// One stored (identity email, access token) pair for a provider.
#[derive(Debug, Clone)]
pub struct StoredAccount {
    pub identity_email: String,
    pub access_token: String,
}

/// Read/write accessors the core calls on the account store.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// All stored token pairs for a provider, in no particular order.
    async fn accounts_with_tokens(&self, provider: Provider) -> Result<Vec<StoredAccount>>;

    /// Resolve the user owning an identity email for a provider.
    async fn user_by_identity(&self, provider: Provider, email: &str) -> Result<Option<User>>;

    /// The stored access token for a provider identity, if any.
    async fn token_for_identity(&self, provider: Provider, email: &str)
        -> Result<Option<String>>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// The raw favorites blob for a user, if any was ever stored.
    async fn user_favorites(&self, id: UserId) -> Result<Option<String>>;

    /// Replace a user's favorites blob. Returns false when no such user.
    async fn set_user_favorites(&self, id: UserId, blob: &str) -> Result<bool>;
}

/// SQLite-backed account store.
#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user record, returning the assigned id.
    pub async fn create_user(&self, user: NewUser) -> Result<UserId> {
        let result = sqlx::query(
            "INSERT INTO users (username, email_spotify, email_twitch, email_google) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email_spotify)
        .bind(&user.email_twitch)
        .bind(&user.email_google)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Upsert the access token for a provider identity.
    pub async fn set_token(&self, provider: Provider, email: &str, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO tokens (provider, identity_email, token) VALUES (?, ?, ?) \
             ON CONFLICT (provider, identity_email) DO UPDATE SET token = excluded.token",
        )
        .bind(provider.as_str())
        .bind(email)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountStore for SqliteAccountStore {
    async fn accounts_with_tokens(&self, provider: Provider) -> Result<Vec<StoredAccount>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT identity_email, token FROM tokens WHERE provider = ?",
        )
        .bind(provider.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(identity_email, access_token)| StoredAccount {
                identity_email,
                access_token,
            })
            .collect())
    }

    async fn user_by_identity(&self, provider: Provider, email: &str) -> Result<Option<User>> {
        let column = match provider {
            Provider::Spotify => "email_spotify",
            Provider::Twitch => "email_twitch",
            Provider::Google => "email_google",
        };

        let query = format!(
            "SELECT id, username, email_spotify, email_twitch, email_google \
             FROM users WHERE {} = ?",
            column
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn token_for_identity(
        &self,
        provider: Provider,
        email: &str,
    ) -> Result<Option<String>> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT token FROM tokens WHERE provider = ? AND identity_email = ?",
        )
        .bind(provider.as_str())
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(token,)| token))
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email_spotify, email_twitch, email_google \
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn user_favorites(&self, id: UserId) -> Result<Option<String>> {
        let row = sqlx::query_as::<_, (Option<String>,)>(
            "SELECT favorite_selections FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((blob,)) => Ok(blob),
            None => Err(Error::NotFound(format!("user {}", id))),
        }
    }

    async fn set_user_favorites(&self, id: UserId, blob: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET favorite_selections = ? WHERE id = ?")
            .bind(blob)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
