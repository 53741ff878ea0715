use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::LoggingConfig;

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins over the configured level when set. Stdout stays reserved for
/// command output so scripts can parse it.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!(json = config.json, level = %config.level, "Logging initialized");
    Ok(())
}

/// Generate a correlation ID for one transition attempt
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one lock transition on `root`.
///
/// `attempt_id` becomes the id of the pending record if this invocation starts an
/// attempt, so root validation and state loading are already tagged with it.
pub fn create_transition_span(root: &Path, resume: bool, attempt_id: &str) -> tracing::Span {
    tracing::info_span!(
        "lock_transition",
        root = %root.display(),
        resume = resume,
        attempt_id = %attempt_id,
    )
}
