//! Presence registry
//!
//! Single source of truth for "who is online" and "who is listening to
//! what", safe under concurrent writers (login/logout handlers and the
//! poller). Entries are created lazily on first touch and never removed
//! during normal operation; state is acceptable to lose on restart.

use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;
use tunematch_common::events::PushEvent;
use tunematch_common::model::{ListeningInfo, PresenceEntry, UserId};

struct Inner {
    /// First-seen insertion order; gives `snapshot()` a stable ordering
    /// within one process run.
    order: Vec<UserId>,
    entries: HashMap<UserId, PresenceEntry>,
}

impl Inner {
    fn entry_mut(&mut self, user_id: UserId) -> &mut PresenceEntry {
        if !self.entries.contains_key(&user_id) {
            self.order.push(user_id);
            self.entries.insert(
                user_id,
                PresenceEntry {
                    user_id,
                    online: false,
                    listening: None,
                },
            );
        }
        self.entries.get_mut(&user_id).expect("entry just inserted")
    }

    fn snapshot(&self) -> Vec<PresenceEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect()
    }
}

/// Process-wide presence state with snapshot fan-out.
///
/// All mutation goes through single-key upserts under one lock, so
/// concurrent updates to the same user are last-write-wins and overlapping
/// poller ticks cannot corrupt state.
pub struct PresenceRegistry {
    inner: Mutex<Inner>,
    event_tx: broadcast::Sender<PushEvent>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    ///
    /// `capacity` is the push-channel buffer per subscriber; slow
    /// subscribers that fall further behind miss events (they re-sync from
    /// any later snapshot).
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self {
            inner: Mutex::new(Inner {
                order: Vec::new(),
                entries: HashMap::new(),
            }),
            event_tx,
        }
    }

    /// Flip a user's online flag, leaving listening info untouched, and
    /// broadcast the updated snapshot.
    pub fn set_online(&self, user_id: UserId, online: bool) {
        {
            let mut inner = self.inner.lock().expect("registry lock");
            inner.entry_mut(user_id).online = online;
        }
        debug!(user_id, online, "presence changed");
        self.broadcast_snapshot();
    }

    /// Replace a user's listening info, leaving the online flag untouched,
    /// and broadcast the updated snapshot.
    pub fn set_listening(&self, user_id: UserId, info: Option<ListeningInfo>) {
        {
            let mut inner = self.inner.lock().expect("registry lock");
            inner.entry_mut(user_id).listening = info;
        }
        self.broadcast_snapshot();
    }

    /// Upsert listening info without broadcasting.
    ///
    /// Used by the poller, which coalesces a whole tick into one broadcast.
    pub fn apply_listening(&self, user_id: UserId, info: ListeningInfo) {
        let mut inner = self.inner.lock().expect("registry lock");
        inner.entry_mut(user_id).listening = Some(info);
    }

    /// Null out listening info without broadcasting.
    ///
    /// Best-effort: when the registry has no entry for the user yet this is
    /// a no-op rather than entry creation.
    pub fn clear_listening(&self, user_id: UserId) {
        let mut inner = self.inner.lock().expect("registry lock");
        if let Some(entry) = inner.entries.get_mut(&user_id) {
            entry.listening = None;
        }
    }

    /// All entries in first-seen order.
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.inner.lock().expect("registry lock").snapshot()
    }

    /// Broadcast the full current snapshot to all subscribers.
    pub fn broadcast_snapshot(&self) {
        let snapshot = self.snapshot();
        // Ignore send errors (no subscribers is OK)
        let _ = self.event_tx.send(PushEvent::status_update(snapshot));
    }

    /// Subscribe to snapshot broadcasts (used by the SSE handler).
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.event_tx.subscribe()
    }

    /// Current number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}
