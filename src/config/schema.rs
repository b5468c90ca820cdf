//! Configuration schema definitions.
//!
//! Every section has defaults, so an empty file is a valid configuration
//! that talks to the built-in networks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::blockchain::ClientSettings;
use crate::network::{NetworkDescriptor, DEFAULT_NETWORK};
use crate::resilience::RetryPolicy;
use crate::transaction::{EngineSettings, TRANSFER_GAS_LIMIT};

/// Root configuration for the wallet core.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct VaultConfig {
    /// Network used when none is given.
    pub default_network: String,

    /// RPC client settings.
    pub rpc: RpcConfig,

    /// Confirmation wait settings.
    pub confirmation: ConfirmationConfig,

    /// Retry budget for node reads.
    pub retries: RetryPolicy,

    /// Transaction building settings.
    pub transaction: TransactionConfig,

    /// Wallet record persistence.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Networks added to, or replacing, the built-in table.
    pub networks: Vec<NetworkDescriptor>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            default_network: DEFAULT_NETWORK.to_string(),
            rpc: RpcConfig::default(),
            confirmation: ConfirmationConfig::default(),
            retries: RetryPolicy::default(),
            transaction: TransactionConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
            networks: Vec::new(),
        }
    }
}

impl VaultConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            request_timeout: Duration::from_secs(self.rpc.request_timeout_secs),
            poll_interval: Duration::from_millis(self.confirmation.poll_interval_ms),
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            gas_limit: self.transaction.gas_limit,
            confirmation_timeout: Duration::from_secs(self.confirmation.timeout_secs),
            retry: self.retries,
        }
    }
}

/// RPC client settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RpcConfig {
    /// Upper bound for a single RPC call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
        }
    }
}

/// Confirmation wait settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// How long a send waits for inclusion before returning unconfirmed.
    pub timeout_secs: u64,

    /// Receipt polling period in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 180,
            poll_interval_ms: 2000,
        }
    }
}

/// Transaction building settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Gas limit for native transfers.
    pub gas_limit: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }
}

/// Where the wallet record lives.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding the record. In-memory only when unset.
    pub path: Option<String>,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
