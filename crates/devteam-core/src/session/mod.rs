//! Session state — bounded history, key-value context, idle expiration.
//!
//! - [`Session`]: one conversation thread. History is capped at
//!   `max_history` entries (oldest dropped first) and the session expires once
//!   it has been idle for longer than its TTL.
//! - [`SessionManager`]: owns every registered session, evicts expired ones
//!   lazily on lookup or on an explicit sweep, and persists the whole registry
//!   as a single JSON snapshot.
//!
//! # Snapshot format
//!
//! ```json
//! {
//!   "version": 1,
//!   "sessions": {
//!     "abc": {
//!       "id": "abc",
//!       "created_at": "2025-01-01T10:00:00Z",
//!       "last_accessed": "2025-01-01T10:05:00Z",
//!       "max_history": 20,
//!       "ttl_hours": 24.0,
//!       "history": [{"role": "user", "content": "hi", "timestamp": "2025-01-01T10:05:00Z"}],
//!       "context": {"topic": "database"}
//!     }
//!   }
//! }
//! ```

pub mod conversation;
pub mod manager;
pub mod snapshot;

pub use conversation::{HistoryMessage, Session, SessionOptions};
pub use manager::{SessionManager, SessionSummary};
pub use snapshot::SNAPSHOT_VERSION;
