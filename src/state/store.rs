use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::record::{StateRecord, STATE_SCHEMA_VERSION};
use crate::fs::atomic_write;

/// Name of the state file kept at the top of every administered root
pub const STATE_FILE_NAME: &str = "ingest.state.json";

/// Errors that can occur while reading or writing the state record
#[derive(Debug, Error)]
pub enum StateStoreError {
    #[error("IO error on state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("State file {path} has schema version {found}, expected {expected}")]
    VersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Location of the state file for `root`
pub fn state_file_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE_NAME)
}

/// Persistence of the per-root state record.
///
/// Implementations do no locking; callers serialize access per root.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StateStore: Send + Sync {
    /// Read the record for `root`. `Ok(None)` means the root was never administered.
    fn load(&self, root: &Path) -> Result<Option<StateRecord>, StateStoreError>;

    /// Durably replace the record for `root`
    fn save(&self, root: &Path, record: &StateRecord) -> Result<(), StateStoreError>;
}

/// JSON file implementation, one `ingest.state.json` per root
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStateStore;

impl JsonStateStore {
    pub fn new() -> Self {
        Self
    }
}

impl StateStore for JsonStateStore {
    fn load(&self, root: &Path) -> Result<Option<StateRecord>, StateStoreError> {
        let path = state_file_path(root);

        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = ?path, "No existing state file found");
                return Ok(None);
            }
            Err(source) => return Err(StateStoreError::Io { path, source }),
        };

        // Check the version before the shape so a newer schema is reported as such
        let value: serde_json::Value = match serde_json::from_slice(&contents) {
            Ok(value) => value,
            Err(source) => return Err(StateStoreError::Corrupt { path, source }),
        };
        if let Some(found) = value.get("version").and_then(serde_json::Value::as_u64) {
            if found != u64::from(STATE_SCHEMA_VERSION) {
                return Err(StateStoreError::VersionMismatch {
                    path,
                    expected: STATE_SCHEMA_VERSION,
                    found,
                });
            }
        }

        let record: StateRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(source) => return Err(StateStoreError::Corrupt { path, source }),
        };

        debug!(
            file = ?path,
            status = %record.status,
            attempt = record.attempt,
            "State loaded"
        );

        Ok(Some(record))
    }

    fn save(&self, root: &Path, record: &StateRecord) -> Result<(), StateStoreError> {
        let path = state_file_path(root);
        let mut serialized =
            serde_json::to_vec_pretty(record).map_err(StateStoreError::Serialization)?;
        serialized.push(b'\n');

        atomic_write(&path, &serialized).map_err(|source| StateStoreError::Io {
            path: path.clone(),
            source,
        })?;

        info!(
            file = ?path,
            status = %record.status,
            attempt = record.attempt,
            attempt_id = %record.attempt_id,
            "State saved"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::record::{RecordError, TransitionStatus};
    use tempfile::TempDir;

    #[test]
    fn load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let loaded = JsonStateStore::new().load(temp_dir.path()).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStateStore::new();
        let record = StateRecord::pending(temp_dir.path(), None);

        store.save(temp_dir.path(), &record).unwrap();

        let loaded = store.load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn save_overwrites_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStateStore::new();
        let pending = StateRecord::pending(temp_dir.path(), None);
        store.save(temp_dir.path(), &pending).unwrap();

        let failed = pending.into_failed(RecordError {
            kind: "source_missing".to_string(),
            message: "No such file or directory (os error 2)".to_string(),
        });
        store.save(temp_dir.path(), &failed).unwrap();

        let loaded = store.load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(loaded.status, TransitionStatus::Failed);
        assert_eq!(loaded.error.unwrap().kind, "source_missing");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(state_file_path(temp_dir.path()), "{\"status\": \"lock").unwrap();

        let err = JsonStateStore::new().load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StateStoreError::Corrupt { .. }));
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let mut value =
            serde_json::to_value(StateRecord::pending(temp_dir.path(), None)).unwrap();
        value["status"] = serde_json::json!("half-locked");
        fs::write(state_file_path(temp_dir.path()), value.to_string()).unwrap();

        let err = JsonStateStore::new().load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StateStoreError::Corrupt { .. }));
    }

    #[test]
    fn hand_written_minimal_record_loads() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            state_file_path(temp_dir.path()),
            r#"{"status": "locked", "rootPath": "/x"}"#,
        )
        .unwrap();

        let loaded = JsonStateStore::new().load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(loaded.status, TransitionStatus::Locked);
        assert_eq!(loaded.root_path, std::path::PathBuf::from("/x"));
        assert_eq!(loaded.attempt, 0);
    }

    #[test]
    fn missing_status_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(state_file_path(temp_dir.path()), r#"{"version": 1}"#).unwrap();

        let err = JsonStateStore::new().load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StateStoreError::Corrupt { .. }));
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            state_file_path(temp_dir.path()),
            r#"{"version": 2, "status": "locked", "layout": "v2"}"#,
        )
        .unwrap();

        let err = JsonStateStore::new().load(temp_dir.path()).unwrap_err();
        match err {
            StateStoreError::VersionMismatch { expected, found, .. } => {
                assert_eq!(expected, STATE_SCHEMA_VERSION);
                assert_eq!(found, 2);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn leftover_provisional_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".ingest.state.json.abc123.tmp"),
            "{\"status\": \"lo",
        )
        .unwrap();

        let store = JsonStateStore::new();
        assert!(store.load(temp_dir.path()).unwrap().is_none());

        let record = StateRecord::pending(temp_dir.path(), None);
        store.save(temp_dir.path(), &record).unwrap();
        assert_eq!(store.load(temp_dir.path()).unwrap().unwrap(), record);
    }

    #[test]
    fn save_into_missing_root_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("gone");
        let record = StateRecord::pending(&root, None);

        let err = JsonStateStore::new().save(&root, &record).unwrap_err();
        assert!(matches!(err, StateStoreError::Io { .. }));
    }
}
