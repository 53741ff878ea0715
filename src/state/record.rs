use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::telemetry::generate_correlation_id;

/// Schema version written into every state record
pub const STATE_SCHEMA_VERSION: u32 = 1;

/// Last known outcome of a lock transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStatus {
    /// Rename attempted, outcome unconfirmed
    Pending,
    Locked,
    Failed,
}

impl TransitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionStatus::Pending => "pending",
            TransitionStatus::Locked => "locked",
            TransitionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TransitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure detail kept on a `failed` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    pub kind: String,
    pub message: String,
}

/// Persisted marker for one administered root
///
/// Only `status` is required on disk. A hand-written `{"status": "failed"}` is a
/// valid record; the remaining fields fall back to empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    #[serde(default = "default_schema_version")]
    pub version: u32,
    pub status: TransitionStatus,
    #[serde(default)]
    pub root_path: PathBuf,
    /// Number of transition attempts started on this root
    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub attempt_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub pid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

impl StateRecord {
    /// Start a new attempt on `root`, continuing the attempt count of `previous`.
    pub fn pending(root: &Path, previous: Option<&StateRecord>) -> Self {
        Self::pending_with_id(root, previous, generate_correlation_id())
    }

    /// Same as [`StateRecord::pending`] with a caller-chosen attempt id
    pub fn pending_with_id(
        root: &Path,
        previous: Option<&StateRecord>,
        attempt_id: String,
    ) -> Self {
        let attempt = previous.map_or(1, |record| record.attempt.saturating_add(1));

        Self {
            version: STATE_SCHEMA_VERSION,
            status: TransitionStatus::Pending,
            root_path: root.to_path_buf(),
            attempt,
            attempt_id,
            updated_at: Some(Utc::now()),
            hostname: current_hostname(),
            pid: std::process::id(),
            error: None,
        }
    }

    pub fn into_locked(self) -> Self {
        Self {
            status: TransitionStatus::Locked,
            updated_at: Some(Utc::now()),
            error: None,
            ..self
        }
    }

    pub fn into_failed(self, error: RecordError) -> Self {
        Self {
            status: TransitionStatus::Failed,
            updated_at: Some(Utc::now()),
            error: Some(error),
            ..self
        }
    }
}

fn default_schema_version() -> u32 {
    STATE_SCHEMA_VERSION
}

fn current_hostname() -> String {
    hostname::get()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
