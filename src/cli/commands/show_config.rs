use anyhow::Result;

use super::Command;
use crate::config::IngestAdminConfig;
use crate::lock::exit_codes;

pub struct ConfigCommand {
    config: IngestAdminConfig,
}

impl ConfigCommand {
    pub fn new(config: IngestAdminConfig) -> Self {
        Self { config }
    }
}

impl Command for ConfigCommand {
    fn execute(&self) -> Result<u8> {
        print!("{}", self.config.to_toml()?);
        Ok(exit_codes::SUCCESS)
    }
}
