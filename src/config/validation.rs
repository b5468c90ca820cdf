//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Value ranges (timeouts > 0, retry budget sane, gas limit ≥ 21000)
//! - Network table integrity (ids, chain ids, endpoint URLs, default network)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: VaultConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::VaultConfig;
use crate::network::{builtin_networks, NetworkRegistry};
use crate::transaction::TRANSFER_GAS_LIMIT;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every rule and report every violation.
///
/// The default network must be built in or listed under `networks`.
pub fn validate_config(config: &VaultConfig) -> Result<(), Vec<ValidationError>> {
    check_config(config, |id| {
        config.networks.iter().any(|n| n.id == id) || builtin_networks().iter().any(|n| n.id == id)
    })
}

/// Like [`validate_config`], with the default network looked up in `registry`.
pub fn validate_config_for(
    config: &VaultConfig,
    registry: &NetworkRegistry,
) -> Result<(), Vec<ValidationError>> {
    check_config(config, |id| registry.contains(id))
}

fn check_config(
    config: &VaultConfig,
    known_network: impl Fn(&str) -> bool,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rpc.request_timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.request_timeout_secs", "must be > 0"));
    }

    if config.confirmation.timeout_secs == 0 {
        errors.push(ValidationError::new("confirmation.timeout_secs", "must be > 0"));
    }
    if config.confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new("confirmation.poll_interval_ms", "must be > 0"));
    } else if config.confirmation.poll_interval_ms > config.confirmation.timeout_secs.saturating_mul(1000) {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must not exceed the confirmation timeout",
        ));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.transaction.gas_limit < TRANSFER_GAS_LIMIT {
        errors.push(ValidationError::new(
            "transaction.gas_limit",
            format!("must be >= {TRANSFER_GAS_LIMIT}"),
        ));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if let Some(path) = &config.store.path {
        if path.trim().is_empty() {
            errors.push(ValidationError::new("store.path", "must not be empty when set"));
        }
    }

    let mut ids = HashSet::new();
    let mut chain_ids = HashSet::new();
    for (i, network) in config.networks.iter().enumerate() {
        let field = |name: &str| format!("networks[{i}].{name}");

        if network.id.trim().is_empty() {
            errors.push(ValidationError::new(field("id"), "must not be empty"));
        } else if !ids.insert(network.id.as_str()) {
            errors.push(ValidationError::new(
                field("id"),
                format!("duplicate network id '{}'", network.id),
            ));
        }

        if network.chain_id == 0 {
            errors.push(ValidationError::new(field("chain_id"), "must be > 0"));
        } else if !chain_ids.insert(network.chain_id) {
            errors.push(ValidationError::new(
                field("chain_id"),
                format!("duplicate chain id {}", network.chain_id),
            ));
        }

        check_endpoint(&network.rpc_endpoint, field("rpc_url"), &mut errors);
        for (j, url) in network.failover_endpoints.iter().enumerate() {
            check_endpoint(url, field(&format!("failover_urls[{j}]")), &mut errors);
        }

        if network.native_symbol.trim().is_empty() {
            errors.push(ValidationError::new(field("symbol"), "must not be empty"));
        }
    }

    if !known_network(&config.default_network) {
        errors.push(ValidationError::new(
            "default_network",
            format!("unknown network '{}'", config.default_network),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(raw: &str, field: String, errors: &mut Vec<ValidationError>) {
    match raw.parse::<url::Url>() {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {e}"))),
    }
}
