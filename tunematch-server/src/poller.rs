//! Listening-status poller
//!
//! Background task that refreshes the presence registry's listening state
//! from the external providers on a fixed cadence. Per-account failures are
//! isolated; a provider outage never crashes the process, it logs and the
//! next tick tries again.

use crate::registry::PresenceRegistry;
use crate::services::StreamingProvider;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tunematch_common::db::{AccountStore, StoredAccount};
use tunematch_common::model::Provider;

/// A provider whose accounts get polled for listening status.
pub struct ProviderSource {
    pub provider: Provider,
    pub client: Arc<dyn StreamingProvider>,
}

/// Periodically refreshes listening state for every account with a stored
/// token, then broadcasts exactly one snapshot per tick.
pub struct ListeningStatusPoller {
    registry: Arc<PresenceRegistry>,
    store: Arc<dyn AccountStore>,
    sources: Vec<ProviderSource>,
}

impl ListeningStatusPoller {
    pub fn new(
        registry: Arc<PresenceRegistry>,
        store: Arc<dyn AccountStore>,
        sources: Vec<ProviderSource>,
    ) -> Self {
        Self {
            registry,
            store,
            sources,
        }
    }

    /// Run the poll loop forever. A tick still in flight when the next is
    /// due causes the next to be skipped; single-key upserts keep state
    /// consistent either way.
    pub async fn run(self, interval: Duration) {
        info!(interval_secs = interval.as_secs(), "listening-status poller started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// One poll pass: refresh every stored account concurrently, then
    /// broadcast the full snapshot once.
    pub async fn tick(&self) {
        for source in &self.sources {
            let accounts = match self.store.accounts_with_tokens(source.provider).await {
                Ok(accounts) => accounts,
                Err(e) => {
                    error!(provider = %source.provider, "Failed to load stored tokens: {}", e);
                    continue;
                }
            };

            debug!(provider = %source.provider, count = accounts.len(), "polling accounts");

            let refreshes = accounts
                .iter()
                .map(|account| self.refresh_account(source, account));
            join_all(refreshes).await;
        }

        // One broadcast per tick bounds push-channel traffic regardless of
        // how many accounts changed
        self.registry.broadcast_snapshot();
    }

    async fn refresh_account(&self, source: &ProviderSource, account: &StoredAccount) {
        let user = match self
            .store
            .user_by_identity(source.provider, &account.identity_email)
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                // Orphaned token: the identity no longer maps to a user
                debug!(provider = %source.provider, identity = %account.identity_email,
                    "skipping orphaned token");
                return;
            }
            Err(e) => {
                warn!(identity = %account.identity_email, "User lookup failed: {}", e);
                return;
            }
        };

        match source.client.currently_playing(&account.access_token).await {
            Ok(Some(info)) => {
                debug!(user_id = user.id, track = %info.track_name, "listening update");
                self.registry.apply_listening(user.id, info);
            }
            Ok(None) => {
                self.registry.clear_listening(user.id);
            }
            Err(e) => {
                warn!(user_id = user.id, provider = %source.provider,
                    "Listening status refresh failed: {}", e);
                self.registry.clear_listening(user.id);
            }
        }
    }
}
