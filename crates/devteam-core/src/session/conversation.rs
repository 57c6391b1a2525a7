//! A single conversation session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::snapshot::SessionRecord;

/// Default number of messages retained per session.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Default idle time before a session expires, in hours.
pub const DEFAULT_TTL_HOURS: f64 = 24.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

// ─────────────────────────────────────────────
// HistoryMessage
// ─────────────────────────────────────────────

/// One entry in a session's history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryMessage {
    /// Free-form role tag (`"user"`, `"assistant"`, `"system"`, …).
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryMessage {
    /// Create a message stamped with the current time.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        HistoryMessage {
            role: role.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────
// SessionOptions
// ─────────────────────────────────────────────

/// Retention parameters applied when a session is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum history length. Always at least 1.
    pub max_history: usize,
    /// Idle duration after which the session expires.
    pub ttl: Duration,
}

impl SessionOptions {
    /// Build options from a history cap and a TTL expressed in (fractional) hours.
    pub fn new(max_history: usize, ttl_hours: f64) -> Self {
        SessionOptions {
            max_history: max_history.max(1),
            ttl: ttl_from_hours(ttl_hours),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY, DEFAULT_TTL_HOURS)
    }
}

/// Convert fractional hours into a millisecond-precision duration.
///
/// NaN and negative values become zero; huge values saturate.
pub fn ttl_from_hours(hours: f64) -> Duration {
    if hours.is_nan() || hours <= 0.0 {
        return Duration::zero();
    }
    // `as` saturates at i64::MAX for out-of-range floats.
    let millis = (hours * MILLIS_PER_HOUR).round() as i64;
    Duration::milliseconds(millis)
}

/// Express a duration as fractional hours, at millisecond precision.
pub fn ttl_to_hours(ttl: Duration) -> f64 {
    ttl.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// Bounded, self-expiring state for one conversation.
///
/// `last_accessed` only moves on mutation (`add_message`, `update_context`);
/// reads never extend the session's lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "SessionRecord", from = "SessionRecord")]
pub struct Session {
    pub(crate) id: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_accessed: DateTime<Utc>,
    pub(crate) max_history: usize,
    pub(crate) ttl: Duration,
    pub(crate) history: Vec<HistoryMessage>,
    pub(crate) context: Map<String, Value>,
}

impl Session {
    /// Create an empty session.
    ///
    /// A random UUID is used when `id` is `None`. A `max_history` of zero is
    /// raised to one and a negative `ttl` is treated as zero. The `ttl` is
    /// kept at millisecond precision, the resolution of the snapshot format.
    pub fn new(id: Option<String>, max_history: usize, ttl: Duration) -> Self {
        let now = Utc::now();
        Session {
            id: id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            created_at: now,
            last_accessed: now,
            max_history: max_history.max(1),
            ttl: Duration::milliseconds(ttl.max(Duration::zero()).num_milliseconds()),
            history: Vec::new(),
            context: Map::new(),
        }
    }

    /// Create an empty session from [`SessionOptions`].
    pub fn with_options(id: Option<String>, options: &SessionOptions) -> Self {
        Self::new(id, options.max_history, options.ttl)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Full retained history, oldest first.
    pub fn history(&self) -> &[HistoryMessage] {
        &self.history
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a message, dropping the oldest entries beyond `max_history`.
    pub fn add_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.history.push(HistoryMessage::new(role, content));
        if self.history.len() > self.max_history {
            let overflow = self.history.len() - self.max_history;
            self.history.drain(..overflow);
        }
        self.touch();
    }

    /// The last `limit` messages in chronological order, or the whole history
    /// when `limit` is `None`.
    pub fn recent_history(&self, limit: Option<usize>) -> &[HistoryMessage] {
        match limit {
            Some(n) => {
                let start = self.history.len().saturating_sub(n);
                &self.history[start..]
            }
            None => &self.history,
        }
    }

    /// Set a context value, replacing any previous value under `key`.
    pub fn update_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context.insert(key.into(), value.into());
        self.touch();
    }

    /// Look up a context value.
    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    /// Look up a context value, falling back to `default` when unset.
    pub fn get_context_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.context.get(key).unwrap_or(default)
    }

    /// Whether the session has been idle for longer than its TTL.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiration check against an explicit clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_accessed.checked_add_signed(self.ttl) {
            Some(deadline) => now > deadline,
            // Deadline beyond the representable range: never expires.
            None => false,
        }
    }

    fn touch(&mut self) {
        self.last_accessed = self.last_accessed.max(Utc::now());
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
