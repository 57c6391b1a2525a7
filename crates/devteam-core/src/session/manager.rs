//! Session registry with lazy expiry and bulk snapshot persistence.
//!
//! The manager owns every [`Session`] it registers; callers borrow them.
//! It has no internal locking; share one manager between tasks behind a
//! single mutex.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::conversation::{ttl_from_hours, Session, SessionOptions};
use super::snapshot::{read_snapshot, write_snapshot};
use crate::error::SnapshotError;

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Owns a set of sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionManager {
    /// Registered sessions (expired entries linger until observed or swept).
    sessions: HashMap<String, Session>,
    /// Parameters for sessions created without explicit values.
    defaults: SessionOptions,
}

impl SessionManager {
    /// Create an empty manager with the standard defaults (20 messages, 24 h).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager whose new sessions use `defaults`.
    pub fn with_defaults(defaults: SessionOptions) -> Self {
        SessionManager {
            sessions: HashMap::new(),
            defaults,
        }
    }

    /// Options applied to parameters omitted from [`create`](Self::create).
    pub fn defaults(&self) -> &SessionOptions {
        &self.defaults
    }

    /// Construct a session and register it, replacing any entry with the same id.
    pub fn create(
        &mut self,
        id: Option<&str>,
        max_history: Option<usize>,
        ttl_hours: Option<f64>,
    ) -> &mut Session {
        let options = SessionOptions {
            max_history: max_history.map_or(self.defaults.max_history, |n| n.max(1)),
            ttl: ttl_hours.map_or(self.defaults.ttl, ttl_from_hours),
        };
        let session = Session::with_options(id.map(String::from), &options);
        debug!(session = %session.id, max_history = options.max_history, "created session");

        match self.sessions.entry(session.id.clone()) {
            Entry::Occupied(mut slot) => {
                debug!(session = %session.id, "replacing existing session");
                slot.insert(session);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(session),
        }
    }

    /// Look up a live session.
    ///
    /// An expired entry is removed from the registry by this call and `None`
    /// is returned.
    pub fn get(&mut self, id: &str) -> Option<&mut Session> {
        if self.evict_if_expired(id, Utc::now()) {
            return None;
        }
        self.sessions.get_mut(id)
    }

    /// Look up a live session, creating one with the default options if it is
    /// absent or expired.
    pub fn get_or_create(&mut self, id: &str) -> &mut Session {
        self.evict_if_expired(id, Utc::now());
        let defaults = self.defaults;
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session = %id, "created session");
                Session::with_options(Some(id.to_string()), &defaults)
            })
    }

    /// Remove every expired session and return how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        let removed = before - self.sessions.len();
        if removed > 0 {
            info!(removed, remaining = self.sessions.len(), "swept expired sessions");
        }
        removed
    }

    /// Remove a session regardless of its expiry state.
    pub fn remove(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Whether `id` is registered (expired or not). Does not evict.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Number of registered sessions, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Registered session ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sessions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Summaries of every registered session, most recently used first.
    pub fn summaries(&self) -> Vec<SessionSummary> {
        let now = Utc::now();
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .values()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                created_at: s.created_at,
                last_accessed: s.last_accessed,
                messages: s.history.len(),
                expired: s.is_expired_at(now),
            })
            .collect();
        summaries.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        summaries
    }

    /// Write every registered session, expired or not, to `path`.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        write_snapshot(path, self.sessions.values())?;
        debug!(
            sessions = self.sessions.len(),
            path = %path.display(),
            "saved session snapshot"
        );
        Ok(())
    }

    /// Rebuild a manager from the snapshot at `path` using the standard defaults.
    ///
    /// See [`load_with_defaults`](Self::load_with_defaults).
    pub fn load(path: &Path) -> Self {
        Self::load_with_defaults(path, SessionOptions::default())
    }

    /// Rebuild a manager from the snapshot at `path`.
    ///
    /// Sessions already expired at load time are skipped. A missing file
    /// yields an empty manager; an unreadable or malformed file does too,
    /// after logging a warning.
    pub fn load_with_defaults(path: &Path, defaults: SessionOptions) -> Self {
        Self::try_load_with_defaults(path, defaults).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unusable session snapshot");
            Self::with_defaults(defaults)
        })
    }

    /// Like [`load`](Self::load), but an unreadable or malformed snapshot is
    /// returned as an error.
    pub fn try_load(path: &Path) -> Result<Self, SnapshotError> {
        Self::try_load_with_defaults(path, SessionOptions::default())
    }

    /// Like [`load_with_defaults`](Self::load_with_defaults), but an
    /// unreadable or malformed snapshot is returned as an error. A missing
    /// file is still an empty manager.
    ///
    /// Callers that write the manager back to `path` should use this so a
    /// damaged file is never replaced by an empty one.
    pub fn try_load_with_defaults(
        path: &Path,
        defaults: SessionOptions,
    ) -> Result<Self, SnapshotError> {
        let mut manager = Self::with_defaults(defaults);

        let snapshot = match read_snapshot(path) {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "no session snapshot, starting empty");
                return Ok(manager);
            }
            Err(e) => return Err(e),
        };

        let now = Utc::now();
        let total = snapshot.sessions.len();
        for session in snapshot.sessions.into_values() {
            if session.is_expired_at(now) {
                debug!(session = %session.id, "skipping expired session from snapshot");
                continue;
            }
            manager.sessions.insert(session.id.clone(), session);
        }

        info!(
            loaded = manager.sessions.len(),
            skipped = total - manager.sessions.len(),
            path = %path.display(),
            "loaded session snapshot"
        );
        Ok(manager)
    }

    /// Drop `id` if it is registered and expired at `now`. Returns whether it was dropped.
    fn evict_if_expired(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let expired = self
            .sessions
            .get(id)
            .is_some_and(|session| session.is_expired_at(now));
        if expired {
            self.sessions.remove(id);
            debug!(session = %id, "evicted expired session");
        }
        expired
    }
}

/// Summary of a session for listing purposes.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Number of retained messages.
    pub messages: usize,
    /// Whether the session was expired when the summary was taken.
    pub expired: bool,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
