// Lock transition: atomic `in` -> `locked` rename with resumable state

pub mod errors;
pub mod layout;
pub mod transition;

pub use errors::{exit_codes, RenameFailure, TransitionError};
pub use layout::{RootLayout, INBOUND_DIR, LOCKED_DIR};
pub use transition::{LockTransition, StateReport, TransitionOutcome, TransitionState};
