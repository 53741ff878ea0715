use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "ingest-admin.toml";

/// Main configuration structure for ingest-admin
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestAdminConfig {
    pub logging: LoggingConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Root used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl IngestAdminConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. `ingest-admin.toml` in the working directory
    /// 3. An explicit config file
    /// 4. Environment variables (`INGEST_ADMIN_LOGGING__LEVEL=debug`)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("INGEST_ADMIN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to read configuration sources")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
        }
        Ok(())
    }

    /// Render the effective configuration
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }

    /// Root from the command line, falling back to `admin.root`
    pub fn resolve_root(&self, cli_root: Option<PathBuf>) -> Option<PathBuf> {
        cli_root.or_else(|| self.admin.root.clone())
    }
}
