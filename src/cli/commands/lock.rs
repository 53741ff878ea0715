use anyhow::Result;
use std::path::PathBuf;

use super::Command;
use crate::lock::{exit_codes, LockTransition, RootLayout, TransitionError, TransitionOutcome};

pub struct LockCommand {
    pub root: PathBuf,
    pub resume: bool,
    transition: LockTransition,
}

impl LockCommand {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            resume: false,
            transition: LockTransition::new(),
        }
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    fn report_success(&self, outcome: &TransitionOutcome) {
        let layout = RootLayout::new(&self.root);
        let record = outcome.record();

        match outcome {
            TransitionOutcome::AlreadyLocked(_) => {
                println!(
                    "✅ {} is already locked (attempt {}), nothing to do",
                    layout.root().display(),
                    record.attempt
                );
            }
            TransitionOutcome::Locked(_) => {
                println!(
                    "🔒 Locked {} -> {} (attempt {})",
                    layout.inbound().display(),
                    layout.locked().display(),
                    record.attempt
                );
            }
            TransitionOutcome::Recovered(_) => {
                println!(
                    "🔒 {} was already renamed by an earlier attempt; recorded as locked (attempt {})",
                    layout.locked().display(),
                    record.attempt
                );
            }
        }
    }

    fn report_failure(&self, err: &TransitionError) {
        eprintln!("❌ {err}");
        match err {
            TransitionError::RenameError { .. } | TransitionError::Unrecorded { .. } => {
                eprintln!("   → Fix the cause above, then re-run with --resume");
            }
            TransitionError::StateMismatch { .. } => {
                eprintln!(
                    "   → Not corrected automatically; inspect {} before changing anything",
                    RootLayout::new(&self.root).state_file().display()
                );
            }
            _ => {}
        }
    }
}

impl Command for LockCommand {
    fn execute(&self) -> Result<u8> {
        match self.transition.transition(&self.root, self.resume) {
            Ok(outcome) => {
                self.report_success(&outcome);
                Ok(exit_codes::SUCCESS)
            }
            Err(err) => {
                self.report_failure(&err);
                Ok(err.exit_code())
            }
        }
    }
}
