use std::fmt;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

use crate::state::{StateStoreError, TransitionStatus};

/// Process exit codes for each outcome of the admin command
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    /// State file IO and any failure without a dedicated code
    pub const FAILURE: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const ALREADY_ATTEMPTED: u8 = 3;
    pub const STATE_MISMATCH: u8 = 4;
    pub const RENAME_FAILED: u8 = 5;
    pub const INVALID_ROOT: u8 = 6;
    /// EX_CONFIG from sysexits.h
    pub const CONFIG: u8 = 78;
}

/// Why the inbound-to-locked rename failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenameFailure {
    PermissionDenied,
    CrossDevice,
    SourceMissing,
    StorageFull,
    /// Something that is not an empty directory sits at the locked path
    TargetOccupied,
    Other,
}

impl RenameFailure {
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
                RenameFailure::PermissionDenied
            }
            ErrorKind::CrossesDevices => RenameFailure::CrossDevice,
            ErrorKind::NotFound => RenameFailure::SourceMissing,
            ErrorKind::StorageFull | ErrorKind::QuotaExceeded => RenameFailure::StorageFull,
            ErrorKind::AlreadyExists
            | ErrorKind::NotADirectory
            | ErrorKind::IsADirectory
            | ErrorKind::DirectoryNotEmpty => RenameFailure::TargetOccupied,
            _ => RenameFailure::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenameFailure::PermissionDenied => "permission_denied",
            RenameFailure::CrossDevice => "cross_device",
            RenameFailure::SourceMissing => "source_missing",
            RenameFailure::StorageFull => "storage_full",
            RenameFailure::TargetOccupied => "target_occupied",
            RenameFailure::Other => "other",
        }
    }
}

impl fmt::Display for RenameFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the lock transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Root {root} cannot be administered: {reason}")]
    InvalidRoot { root: PathBuf, reason: String },

    #[error("State file error: {0}")]
    StateIo(#[from] StateStoreError),

    #[error(
        "{from} was renamed to {to} but the locked state could not be recorded \
         (pass --resume to reconcile): {source}"
    )]
    Unrecorded {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: StateStoreError,
    },

    #[error("A previous transition attempt is recorded as {status}; pass --resume to retry")]
    AlreadyAttempted { status: TransitionStatus },

    #[error("State mismatch under {root}: {detail}")]
    StateMismatch { root: PathBuf, detail: String },

    #[error("Failed to rename {from} to {to} ({kind}): {source}")]
    RenameError {
        kind: RenameFailure,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransitionError {
    pub fn exit_code(&self) -> u8 {
        match self {
            TransitionError::InvalidRoot { .. } => exit_codes::INVALID_ROOT,
            TransitionError::StateIo(_) | TransitionError::Unrecorded { .. } => {
                exit_codes::FAILURE
            }
            TransitionError::AlreadyAttempted { .. } => exit_codes::ALREADY_ATTEMPTED,
            TransitionError::StateMismatch { .. } => exit_codes::STATE_MISMATCH,
            TransitionError::RenameError { .. } => exit_codes::RENAME_FAILED,
        }
    }

    /// Whether re-running with `--resume` can make progress without operator repair
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            TransitionError::AlreadyAttempted { .. }
                | TransitionError::Unrecorded { .. }
                | TransitionError::RenameError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_rename_failures() {
        let cases = [
            (ErrorKind::PermissionDenied, RenameFailure::PermissionDenied),
            (ErrorKind::CrossesDevices, RenameFailure::CrossDevice),
            (ErrorKind::NotFound, RenameFailure::SourceMissing),
            (ErrorKind::StorageFull, RenameFailure::StorageFull),
            (ErrorKind::NotADirectory, RenameFailure::TargetOccupied),
            (ErrorKind::DirectoryNotEmpty, RenameFailure::TargetOccupied),
            (ErrorKind::Interrupted, RenameFailure::Other),
        ];

        for (kind, expected) in cases {
            assert_eq!(RenameFailure::classify(&io::Error::from(kind)), expected, "{kind:?}");
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn classifies_raw_os_errors() {
        // EXDEV, ENOSPC, ENOTDIR
        assert_eq!(
            RenameFailure::classify(&io::Error::from_raw_os_error(18)),
            RenameFailure::CrossDevice
        );
        assert_eq!(
            RenameFailure::classify(&io::Error::from_raw_os_error(28)),
            RenameFailure::StorageFull
        );
        assert_eq!(
            RenameFailure::classify(&io::Error::from_raw_os_error(20)),
            RenameFailure::TargetOccupied
        );
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let already = TransitionError::AlreadyAttempted {
            status: TransitionStatus::Failed,
        };
        let mismatch = TransitionError::StateMismatch {
            root: PathBuf::from("/data/feed"),
            detail: "locked directory missing".to_string(),
        };
        let rename = TransitionError::RenameError {
            kind: RenameFailure::CrossDevice,
            from: PathBuf::from("/data/feed/in"),
            to: PathBuf::from("/data/feed/locked"),
            source: io::Error::from(ErrorKind::CrossesDevices),
        };

        assert_eq!(already.exit_code(), exit_codes::ALREADY_ATTEMPTED);
        assert_eq!(mismatch.exit_code(), exit_codes::STATE_MISMATCH);
        assert_eq!(rename.exit_code(), exit_codes::RENAME_FAILED);
        assert!(already.is_resumable());
        assert!(rename.is_resumable());
        assert!(!mismatch.is_resumable());
    }

    #[test]
    fn already_attempted_tells_operator_to_resume() {
        let err = TransitionError::AlreadyAttempted {
            status: TransitionStatus::Pending,
        };

        let message = err.to_string();
        assert!(message.contains("pending"));
        assert!(message.contains("--resume"));
    }
}
