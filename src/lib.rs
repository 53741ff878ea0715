// ingest-admin library - resumable lock transition for ingestion roots
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod fs;
pub mod lock;
pub mod state;
pub mod telemetry;

// Re-export key types for easy access
pub use config::IngestAdminConfig;
pub use fs::{atomic_write, FileSystemOperations, StandardFileSystem};
pub use lock::{
    exit_codes, LockTransition, RenameFailure, RootLayout, StateReport, TransitionError,
    TransitionOutcome, TransitionState,
};
pub use state::{JsonStateStore, StateRecord, StateStore, StateStoreError, TransitionStatus};
pub use telemetry::{create_transition_span, generate_correlation_id, init_telemetry};
