//! On-disk snapshot records.
//!
//! [`Session`] serializes through [`SessionRecord`] so the file layout stays
//! stable while the in-memory type keeps its fields private. Invariants are
//! re-established on the way in: a hand-edited file cannot produce a session
//! with `max_history == 0` or a history longer than its cap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::conversation::{ttl_from_hours, ttl_to_hours, HistoryMessage, Session};
use crate::error::SnapshotError;

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serialized form of one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(alias = "session_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub max_history: usize,
    pub ttl_hours: f64,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        SessionRecord {
            id: session.id,
            created_at: session.created_at,
            last_accessed: session.last_accessed,
            max_history: session.max_history,
            ttl_hours: ttl_to_hours(session.ttl),
            history: session.history,
            context: session.context,
        }
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let max_history = record.max_history.max(1);
        let mut history = record.history;
        if history.len() > max_history {
            let overflow = history.len() - max_history;
            history.drain(..overflow);
        }
        Session {
            id: record.id,
            created_at: record.created_at,
            last_accessed: record.last_accessed,
            max_history,
            ttl: ttl_from_hours(record.ttl_hours),
            history,
            context: record.context,
        }
    }
}

/// The whole snapshot document, keyed by session id.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub sessions: HashMap<String, Session>,
}

/// Write a snapshot to `path`.
///
/// The document is written to `<path>.tmp` first and then renamed
/// over `path`, so a crash mid-write leaves the previous snapshot intact.
pub(crate) fn write_snapshot<'a>(
    path: &Path,
    sessions: impl Iterator<Item = &'a Session>,
) -> Result<(), SnapshotError> {
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        sessions: sessions.map(|s| (s.id.clone(), s.clone())).collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    let result = std::fs::write(&tmp_path, json)
        .map_err(|source| SnapshotError::Io {
            path: tmp_path.clone(),
            source,
        })
        .and_then(|()| {
            std::fs::rename(&tmp_path, path).map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })
        });
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

/// Sibling temp file: `sessions.json` → `sessions.json.tmp`.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Read and parse a snapshot.
pub(crate) fn read_snapshot(path: &Path) -> Result<SnapshotFile, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_field_names() {
        let mut session = Session::new(Some("abc".into()), 3, chrono::Duration::minutes(30));
        session.add_message("user", "hello");
        session.update_context("name", "Jan");

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["max_history"], 3);
        assert_eq!(value["ttl_hours"], 0.5);
        assert_eq!(value["history"][0]["role"], "user");
        assert_eq!(value["history"][0]["content"], "hello");
        assert!(value["history"][0]["timestamp"].is_string());
        assert!(value["created_at"].is_string());
        assert!(value["last_accessed"].is_string());
        assert_eq!(value["context"]["name"], "Jan");
    }

    #[test]
    fn test_legacy_session_id_and_missing_version() {
        let raw = json!({
            "sessions": {
                "legacy": {
                    "session_id": "legacy",
                    "created_at": "2025-01-01T10:00:00Z",
                    "last_accessed": "2025-01-01T10:00:00Z",
                    "max_history": 20,
                    "ttl_hours": 24.0,
                    "history": [],
                    "context": {}
                }
            }
        });
        let file: SnapshotFile = serde_json::from_value(raw).unwrap();
        assert_eq!(file.version, SNAPSHOT_VERSION);
        assert_eq!(file.sessions["legacy"].id(), "legacy");
    }

    #[test]
    fn test_record_invariants_restored() {
        let raw = json!({
            "id": "edited",
            "created_at": "2025-01-01T10:00:00Z",
            "last_accessed": "2025-01-01T10:00:00Z",
            "max_history": 0,
            "ttl_hours": -1.0,
            "history": [
                {"role": "user", "content": "a", "timestamp": "2025-01-01T10:00:00Z"},
                {"role": "user", "content": "b", "timestamp": "2025-01-01T10:00:01Z"}
            ]
        });
        let session: Session = serde_json::from_value(raw).unwrap();
        assert_eq!(session.max_history(), 1);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].content, "b");
        assert_eq!(session.ttl(), chrono::Duration::zero());
        assert!(session.context().is_empty());
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        assert_eq!(
            tmp_path_for(Path::new("/data/sessions.json")),
            PathBuf::from("/data/sessions.json.tmp")
        );
        assert_eq!(tmp_path_for(Path::new("sessions")), PathBuf::from("sessions.tmp"));
    }

    #[test]
    fn test_write_leaves_unrelated_tmp_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let unrelated = dir.path().join("sessions.tmp");
        std::fs::write(&unrelated, "keep me").unwrap();

        let path = dir.path().join("sessions.json");
        write_snapshot(&path, std::iter::empty::<&Session>()).unwrap();

        assert_eq!(std::fs::read_to_string(&unrelated).unwrap(), "keep me");
        assert!(read_snapshot(&path).unwrap().sessions.is_empty());
    }

    #[test]
    fn test_failed_rename_removes_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("sessions.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), "x").unwrap();

        let err = write_snapshot(&path, std::iter::empty::<&Session>()).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(!dir.path().join("sessions.json.tmp").exists());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.json");
        let session = Session::new(Some("one".into()), 5, chrono::Duration::hours(1));

        write_snapshot(&path, std::iter::once(&session)).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("sessions.json.tmp").exists());

        let file = read_snapshot(&path).unwrap();
        assert_eq!(file.version, SNAPSHOT_VERSION);
        assert_eq!(file.sessions["one"], session);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_snapshot(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
    }
}
