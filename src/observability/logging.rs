//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured events with typed fields
//! - JSON format for machine consumption, human-readable format otherwise
//! - Level from configuration; `RUST_LOG` overrides it when set
//! - Addresses and hashes are logged; keys and phrases never are

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::error::{VaultError, VaultResult};

/// Filter directive for the configured level, scoped to this crate.
pub fn filter_directive(config: &ObservabilityConfig) -> String {
    format!("cryptovault={}", config.log_level.to_lowercase())
}

/// Install the global subscriber.
///
/// Fails when a subscriber is already installed, e.g. when the embedding
/// application set up its own.
pub fn init_logging(config: &ObservabilityConfig) -> VaultResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| VaultError::Config(format!("logging already initialized: {e}")))?;
    tracing::debug!(level = %config.log_level, json = config.json_logs, "Logging initialized");
    Ok(())
}
