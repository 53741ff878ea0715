use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use ingest_admin::cli::commands::{Command, ConfigCommand, LockCommand, StatusCommand};
use ingest_admin::cli::{Cli, Commands};
use ingest_admin::config::{IngestAdminConfig, DEFAULT_CONFIG_FILE};
use ingest_admin::lock::exit_codes;
use ingest_admin::telemetry::init_telemetry;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = IngestAdminConfig::load_env_file() {
        eprintln!("⚠️  Ignoring unreadable .env file: {e}");
    }

    let config = match IngestAdminConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e:#}");
            return ExitCode::from(exit_codes::CONFIG);
        }
    };

    if let Err(e) = init_telemetry(&config.logging) {
        eprintln!("❌ Failed to initialize logging: {e:#}");
        return ExitCode::from(exit_codes::CONFIG);
    }

    match run(cli.command, config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::from(exit_codes::FAILURE)
        }
    }
}

fn run(command: Commands, config: IngestAdminConfig) -> Result<u8> {
    match command {
        Commands::Lock { root, resume } => {
            let Some(root) = require_root(&config, root) else {
                return Ok(exit_codes::USAGE);
            };
            LockCommand::new(root).with_resume(resume).execute()
        }
        Commands::Status {
            root,
            json,
            check_ready,
        } => {
            let Some(root) = require_root(&config, root) else {
                return Ok(exit_codes::USAGE);
            };
            StatusCommand::new(root)
                .with_json(json)
                .with_check_ready(check_ready)
                .execute()
        }
        Commands::Config => ConfigCommand::new(config).execute(),
    }
}

fn require_root(config: &IngestAdminConfig, root: Option<PathBuf>) -> Option<PathBuf> {
    let root = config.resolve_root(root);
    if root.is_none() {
        eprintln!("❌ No root given: pass ROOT or set admin.root in {DEFAULT_CONFIG_FILE}");
    }
    root
}
