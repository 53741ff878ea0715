use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::errors::{RenameFailure, TransitionError};
use super::layout::RootLayout;
use crate::fs::{FileSystemOperations, StandardFileSystem};
use crate::state::{JsonStateStore, RecordError, StateRecord, StateStore, TransitionStatus};
use crate::telemetry::{create_transition_span, generate_correlation_id};

/// Observed state of a root: the record reconciled against the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionState {
    /// Never administered
    Unknown,
    Pending,
    Locked,
    Failed,
    /// Record says locked but the locked directory is gone
    Mismatch,
}

/// Successful result of a transition
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// Root was already locked; nothing was renamed or written
    AlreadyLocked(StateRecord),
    Locked(StateRecord),
    /// An earlier attempt had already renamed the directory; only the record was updated
    Recovered(StateRecord),
}

impl TransitionOutcome {
    pub fn record(&self) -> &StateRecord {
        match self {
            TransitionOutcome::AlreadyLocked(record)
            | TransitionOutcome::Locked(record)
            | TransitionOutcome::Recovered(record) => record,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, TransitionOutcome::AlreadyLocked(_))
    }
}

/// Read-only snapshot of a root, as reported by `inspect`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub root: PathBuf,
    pub state: TransitionState,
    /// Downstream ingestion may start only when this is true
    pub ready: bool,
    pub inbound_present: bool,
    pub locked_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StateRecord>,
}

/// Drives a root from `in` to `locked` exactly once, resumable across restarts.
///
/// The rename is the atomicity primitive; the state record only makes it
/// resumable. The record is saved as pending strictly before the rename and as
/// locked or failed strictly after it returns, so a crash in between always
/// leaves a pending record for `--resume` to reconcile.
pub struct LockTransition {
    fs: Arc<dyn FileSystemOperations>,
    store: Box<dyn StateStore>,
}

impl Default for LockTransition {
    fn default() -> Self {
        Self::new()
    }
}

impl LockTransition {
    pub fn new() -> Self {
        Self::with_components(Arc::new(StandardFileSystem), Box::new(JsonStateStore::new()))
    }

    pub fn with_components(fs: Arc<dyn FileSystemOperations>, store: Box<dyn StateStore>) -> Self {
        Self { fs, store }
    }

    pub fn transition(
        &self,
        root: &Path,
        resume: bool,
    ) -> Result<TransitionOutcome, TransitionError> {
        let layout = RootLayout::new(root);
        let attempt_id = generate_correlation_id();
        let span = create_transition_span(root, resume, &attempt_id);
        let _enter = span.enter();

        self.validate_root(&layout, true)?;

        match self.store.load(layout.root())? {
            Some(record) if record.status == TransitionStatus::Locked => {
                self.confirm_locked(&layout, record)
            }
            Some(record) if !resume => {
                warn!(
                    status = %record.status,
                    attempt = record.attempt,
                    "Previous transition attempt recorded, refusing to retry without resume"
                );
                Err(TransitionError::AlreadyAttempted {
                    status: record.status,
                })
            }
            previous => self.attempt(&layout, previous.as_ref(), attempt_id),
        }
    }

    /// Snapshot of `root` without touching it
    pub fn inspect(&self, root: &Path) -> Result<StateReport, TransitionError> {
        let layout = RootLayout::new(root);
        self.validate_root(&layout, false)?;

        let record = self.store.load(layout.root())?;
        let inbound_present = self.fs.exists(layout.inbound());
        let locked_present = self.fs.is_dir(layout.locked());

        let state = match record.as_ref().map(|r| r.status) {
            None => TransitionState::Unknown,
            Some(TransitionStatus::Pending) => TransitionState::Pending,
            Some(TransitionStatus::Failed) => TransitionState::Failed,
            Some(TransitionStatus::Locked) if locked_present => TransitionState::Locked,
            Some(TransitionStatus::Locked) => TransitionState::Mismatch,
        };

        Ok(StateReport {
            root: root.to_path_buf(),
            state,
            ready: state == TransitionState::Locked,
            inbound_present,
            locked_present,
            record,
        })
    }

    /// True only for a locked record backed by an existing locked directory
    pub fn is_ready(&self, root: &Path) -> Result<bool, TransitionError> {
        Ok(self.inspect(root)?.ready)
    }

    fn validate_root(&self, layout: &RootLayout, writable: bool) -> Result<(), TransitionError> {
        let invalid = |reason: String| TransitionError::InvalidRoot {
            root: layout.root().to_path_buf(),
            reason,
        };

        if !self.fs.is_dir(layout.root()) {
            return Err(invalid("not an existing directory".to_string()));
        }

        if writable {
            match self.fs.is_read_only(layout.root()) {
                Ok(false) => {}
                Ok(true) => return Err(invalid("directory is read-only".to_string())),
                Err(e) => return Err(invalid(format!("cannot read permissions: {e}"))),
            }
        }

        Ok(())
    }

    fn confirm_locked(
        &self,
        layout: &RootLayout,
        record: StateRecord,
    ) -> Result<TransitionOutcome, TransitionError> {
        if self.fs.is_dir(layout.locked()) {
            debug!(attempt = record.attempt, "Root already locked, nothing to do");
            return Ok(TransitionOutcome::AlreadyLocked(record));
        }

        error!(
            locked = ?layout.locked(),
            attempt_id = %record.attempt_id,
            "State record says locked but the locked directory is missing"
        );
        Err(TransitionError::StateMismatch {
            root: layout.root().to_path_buf(),
            detail: format!(
                "state file records the root as locked but {} is not a directory",
                layout.locked().display()
            ),
        })
    }

    fn attempt(
        &self,
        layout: &RootLayout,
        previous: Option<&StateRecord>,
        attempt_id: String,
    ) -> Result<TransitionOutcome, TransitionError> {
        if let Some(record) = previous {
            if record.root_path != layout.root() {
                warn!(
                    recorded_root = ?record.root_path,
                    "State record was written for a different root path"
                );
            }
            info!(
                status = %record.status,
                attempt = record.attempt,
                "Resuming previous transition attempt"
            );
        }

        let pending = StateRecord::pending_with_id(layout.root(), previous, attempt_id);
        self.store.save(layout.root(), &pending)?;

        match self.fs.rename(layout.inbound(), layout.locked()) {
            Ok(()) => {
                info!(
                    from = ?layout.inbound(),
                    to = ?layout.locked(),
                    attempt_id = %pending.attempt_id,
                    "Inbound directory locked"
                );
                self.record_locked(layout, pending)
                    .map(TransitionOutcome::Locked)
            }
            Err(e) if !self.fs.exists(layout.inbound()) && self.fs.is_dir(layout.locked()) => {
                info!(
                    error = %e,
                    attempt_id = %pending.attempt_id,
                    "Inbound directory was already renamed by an earlier attempt, recording locked state"
                );
                self.record_locked(layout, pending)
                    .map(TransitionOutcome::Recovered)
            }
            Err(e) => Err(self.record_failure(layout, pending, e)),
        }
    }

    fn record_locked(
        &self,
        layout: &RootLayout,
        pending: StateRecord,
    ) -> Result<StateRecord, TransitionError> {
        let locked = pending.into_locked();

        match self.store.save(layout.root(), &locked) {
            Ok(()) => Ok(locked),
            Err(source) => {
                error!(
                    error = %source,
                    attempt_id = %locked.attempt_id,
                    "Directory is locked but the state record still says pending"
                );
                Err(TransitionError::Unrecorded {
                    from: layout.inbound().to_path_buf(),
                    to: layout.locked().to_path_buf(),
                    source,
                })
            }
        }
    }

    fn record_failure(
        &self,
        layout: &RootLayout,
        pending: StateRecord,
        err: io::Error,
    ) -> TransitionError {
        let kind = RenameFailure::classify(&err);
        warn!(kind = %kind, error = %err, "Rename failed");

        let failed = pending.into_failed(RecordError {
            kind: kind.to_string(),
            message: err.to_string(),
        });
        if let Err(save_err) = self.store.save(layout.root(), &failed) {
            // The pending record stays behind and is still resumable
            error!(
                error = %save_err,
                attempt_id = %failed.attempt_id,
                "Could not record failed transition"
            );
        }

        TransitionError::RenameError {
            kind,
            from: layout.inbound().to_path_buf(),
            to: layout.locked().to_path_buf(),
            source: err,
        }
    }
}
