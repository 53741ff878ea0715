use anyhow::Result;
use std::path::PathBuf;

use super::Command;
use crate::lock::{exit_codes, LockTransition, StateReport, TransitionState};

/// Exit status of `status --check-ready` when the root is not ready
pub const NOT_READY: u8 = exit_codes::FAILURE;

pub struct StatusCommand {
    pub root: PathBuf,
    pub json: bool,
    pub check_ready: bool,
    transition: LockTransition,
}

impl StatusCommand {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            json: false,
            check_ready: false,
            transition: LockTransition::new(),
        }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_check_ready(mut self, check_ready: bool) -> Self {
        self.check_ready = check_ready;
        self
    }

    fn print_human(&self, report: &StateReport) {
        let marker = match report.state {
            TransitionState::Locked => "🔒",
            TransitionState::Unknown => "📂",
            TransitionState::Pending => "⏳",
            TransitionState::Failed => "❌",
            TransitionState::Mismatch => "⚠️ ",
        };
        let present = |yes: bool| if yes { "present" } else { "absent" };

        println!("{marker} {}", report.root.display());
        println!("   State:   {}", state_label(report.state));
        println!("   Ready:   {}", if report.ready { "yes" } else { "no" });
        println!("   in/:     {}", present(report.inbound_present));
        println!("   locked/: {}", present(report.locked_present));

        if let Some(record) = &report.record {
            let updated_at = record
                .updated_at
                .map_or_else(|| "unknown time".to_string(), |at| at.to_rfc3339());
            println!(
                "   Attempt: {} ({}) by {} pid {} at {}",
                record.attempt, record.attempt_id, record.hostname, record.pid, updated_at
            );
            if let Some(error) = &record.error {
                println!("   Error:   {} - {}", error.kind, error.message);
            }
        }
    }
}

fn state_label(state: TransitionState) -> &'static str {
    match state {
        TransitionState::Unknown => "unknown (never administered)",
        TransitionState::Pending => "pending (outcome unconfirmed, run lock --resume)",
        TransitionState::Locked => "locked",
        TransitionState::Failed => "failed (run lock --resume to retry)",
        TransitionState::Mismatch => "mismatch (record says locked, locked/ is missing)",
    }
}

impl Command for StatusCommand {
    fn execute(&self) -> Result<u8> {
        let report = match self.transition.inspect(&self.root) {
            Ok(report) => report,
            Err(err) => {
                eprintln!("❌ {err}");
                return Ok(err.exit_code());
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            self.print_human(&report);
        }

        if self.check_ready && !report.ready {
            return Ok(NOT_READY);
        }
        Ok(exit_codes::SUCCESS)
    }
}
