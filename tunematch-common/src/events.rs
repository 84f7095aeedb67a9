//! Push event types for the real-time channel
//!
//! Events are broadcast to every connected subscriber and serialized for
//! SSE transmission. The channel is fire-and-forget: no acknowledgment and
//! no delivery guarantee beyond the currently-open connections.

use crate::model::PresenceEntry;
use serde::{Deserialize, Serialize};

/// Events fanned out over the push channel.
///
/// Every registry mutation broadcasts the full snapshot, not a delta, so a
/// client can always rebuild its view from the latest event alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// Full presence snapshot, sent on every state change and as the
    /// catch-up message when a subscriber connects.
    StatusUpdate {
        data: Vec<PresenceEntry>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PushEvent {
    pub fn status_update(data: Vec<PresenceEntry>) -> Self {
        PushEvent::StatusUpdate {
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Event name used for the SSE `event:` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            PushEvent::StatusUpdate { .. } => "status_update",
        }
    }
}
