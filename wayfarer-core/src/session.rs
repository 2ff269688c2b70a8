//! Volatile per-session state.
//!
//! Records live for a fixed time-to-live after their last write and are
//! dropped lazily on read or eagerly through
//! [`SessionStore::purge_expired`]. Updates replace whole fields and the last
//! writer wins.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{Itinerary, OptimizationOptions, Point};

/// Default record lifetime: 24 hours.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// State kept for one user session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// City being planned.
    pub city: Option<String>,
    /// Spots the user selected.
    pub selected_spots: Vec<Point>,
    /// Options of the latest plan.
    pub options: Option<OptimizationOptions>,
    /// Latest itinerary, replacing any earlier one.
    pub itinerary: Option<Itinerary>,
    /// Whether the latest itinerary came from the narrative fallback.
    pub fallback_used: bool,
}

/// Partial record; every `Some` field replaces the stored one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionUpdate {
    /// New city.
    pub city: Option<String>,
    /// New spot selection.
    pub selected_spots: Option<Vec<Point>>,
    /// New options.
    pub options: Option<OptimizationOptions>,
    /// New itinerary.
    pub itinerary: Option<Itinerary>,
    /// New fallback flag.
    pub fallback_used: Option<bool>,
}

impl SessionUpdate {
    fn apply(self, record: &mut SessionRecord) {
        if let Some(city) = self.city {
            record.city = Some(city);
        }
        if let Some(spots) = self.selected_spots {
            record.selected_spots = spots;
        }
        if let Some(options) = self.options {
            record.options = Some(options);
        }
        if let Some(itinerary) = self.itinerary {
            record.itinerary = Some(itinerary);
        }
        if let Some(fallback_used) = self.fallback_used {
            record.fallback_used = fallback_used;
        }
    }
}

/// Keyed session storage.
pub trait SessionStore {
    /// Fetch a live record.
    fn get(&self, session_id: &str) -> Option<SessionRecord>;

    /// Merge `update` into the record for `session_id`, creating it if absent.
    fn set(&self, session_id: &str, update: SessionUpdate);

    /// Drop every expired record and return how many were removed.
    ///
    /// Stores without expiry keep everything.
    fn purge_expired(&self) -> usize {
        0
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, session_id: &str) -> Option<SessionRecord> {
        (**self).get(session_id)
    }

    fn set(&self, session_id: &str, update: SessionUpdate) {
        (**self).set(session_id, update);
    }

    fn purge_expired(&self) -> usize {
        (**self).purge_expired()
    }
}

#[derive(Debug)]
struct Entry {
    written: Instant,
    record: SessionRecord,
}

/// Process-lifetime session store guarded by a mutex.
///
/// # Examples
/// ```
/// use wayfarer_core::{InMemorySessionStore, SessionStore, SessionUpdate};
///
/// let store = InMemorySessionStore::default();
/// store.set("abc", SessionUpdate { city: Some("Kyoto".into()), ..SessionUpdate::default() });
/// assert_eq!(store.get("abc").and_then(|r| r.city).as_deref(), Some("Kyoto"));
/// assert!(store.get("missing").is_none());
/// ```
#[derive(Debug)]
pub struct InMemorySessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl InMemorySessionStore {
    /// Store whose records expire `ttl` after their last write.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored records, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        entry.written.elapsed() >= self.ttl
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Option<SessionRecord> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = entries
            .get(session_id)
            .is_some_and(|entry| self.is_expired(entry));
        if expired {
            log::debug!("session {session_id} expired");
            entries.remove(session_id);
            return None;
        }
        entries.get(session_id).map(|entry| entry.record.clone())
    }

    fn set(&self, session_id: &str, update: SessionUpdate) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut record = entries
            .remove(session_id)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.record)
            .unwrap_or_default();
        update.apply(&mut record);
        entries.insert(
            session_id.to_owned(),
            Entry {
                written: Instant::now(),
                record,
            },
        );
    }

    fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry));
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("purged {removed} expired sessions");
        }
        removed
    }
}
