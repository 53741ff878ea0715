use anyhow::Result;

pub mod lock;
pub mod show_config;
pub mod status;

pub use lock::LockCommand;
pub use show_config::ConfigCommand;
pub use status::StatusCommand;

/// A subcommand; returns the process exit code
pub trait Command {
    fn execute(&self) -> Result<u8>;
}
