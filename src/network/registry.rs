//! Static network table.
//!
//! The registry maps a stable network id to the chain parameters needed to
//! sign and route a transaction. It is populated once at start-up (built-in
//! table plus configured overrides) and shared read-only afterwards.

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Chain parameters for one network.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkDescriptor {
    /// Stable key (e.g. "ethereum", "sepolia").
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// EIP-155 chain id used when signing.
    pub chain_id: u64,

    /// JSON-RPC endpoint URL.
    #[serde(rename = "rpc_url")]
    pub rpc_endpoint: String,

    /// Additional read-only endpoints tried when the primary fails.
    #[serde(default, rename = "failover_urls")]
    pub failover_endpoints: Vec<String>,

    /// Display unit for amounts.
    #[serde(rename = "symbol")]
    pub native_symbol: String,

    /// Block explorer base URL. Display metadata only.
    #[serde(default)]
    pub explorer_url: String,
}

impl NetworkDescriptor {
    fn new(
        id: &str,
        name: &str,
        chain_id: u64,
        rpc_endpoint: &str,
        native_symbol: &str,
        explorer_url: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            chain_id,
            rpc_endpoint: rpc_endpoint.to_string(),
            failover_endpoints: Vec::new(),
            native_symbol: native_symbol.to_string(),
            explorer_url: explorer_url.to_string(),
        }
    }
}

/// Network selected when the caller does not name one.
pub const DEFAULT_NETWORK: &str = "sepolia";

/// The built-in network table.
pub fn builtin_networks() -> Vec<NetworkDescriptor> {
    vec![
        NetworkDescriptor::new(
            "ethereum",
            "Ethereum Mainnet",
            1,
            "https://eth.llamarpc.com",
            "ETH",
            "https://etherscan.io",
        ),
        NetworkDescriptor::new(
            "sepolia",
            "Sepolia Testnet",
            11_155_111,
            "https://rpc.sepolia.org",
            "SepoliaETH",
            "https://sepolia.etherscan.io",
        ),
        NetworkDescriptor::new(
            "polygon",
            "Polygon Mainnet",
            137,
            "https://polygon-rpc.com",
            "MATIC",
            "https://polygonscan.com",
        ),
        NetworkDescriptor::new(
            "bsc",
            "BNB Smart Chain",
            56,
            "https://bsc-dataseed.binance.org",
            "BNB",
            "https://bscscan.com",
        ),
    ]
}

/// Read-only mapping from network id to [`NetworkDescriptor`].
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, NetworkDescriptor>,
}

impl NetworkRegistry {
    /// Build a registry from an explicit list.
    ///
    /// Fails on empty ids, duplicate ids, duplicate chain ids, a zero chain
    /// id or an unparsable RPC URL: signing for the wrong chain id would let
    /// a transaction replay on an unintended network.
    pub fn new(networks: impl IntoIterator<Item = NetworkDescriptor>) -> VaultResult<Self> {
        let mut by_id = BTreeMap::new();
        let mut chain_ids: HashMap<u64, String> = HashMap::new();

        for network in networks {
            Self::check(&network)?;
            if let Some(other) = chain_ids.insert(network.chain_id, network.id.clone()) {
                return Err(VaultError::Config(format!(
                    "networks '{other}' and '{}' share chain id {}",
                    network.id, network.chain_id
                )));
            }
            match by_id.entry(network.id.clone()) {
                Entry::Occupied(_) => {
                    return Err(VaultError::Config(format!(
                        "duplicate network id '{}'",
                        network.id
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(network);
                }
            }
        }

        Ok(Self { networks: by_id })
    }

    /// The built-in table only.
    pub fn builtin() -> Self {
        let networks = builtin_networks()
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        Self { networks }
    }

    /// Built-in table with configured entries replacing or extending it.
    pub fn with_overrides(overrides: Vec<NetworkDescriptor>) -> VaultResult<Self> {
        let mut merged: BTreeMap<String, NetworkDescriptor> = builtin_networks()
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        for network in overrides {
            merged.insert(network.id.clone(), network);
        }
        Self::new(merged.into_values())
    }

    /// Look up a network by id.
    pub fn resolve(&self, id: &str) -> VaultResult<&NetworkDescriptor> {
        self.networks
            .get(id)
            .ok_or_else(|| VaultError::UnknownNetwork(id.to_string()))
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.networks.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Registered networks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkDescriptor> {
        self.networks.values()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    fn check(network: &NetworkDescriptor) -> VaultResult<()> {
        if network.id.trim().is_empty() {
            return Err(VaultError::Config("network id must not be empty".into()));
        }
        if network.chain_id == 0 {
            return Err(VaultError::Config(format!(
                "network '{}' has chain id 0",
                network.id
            )));
        }
        url::Url::parse(&network.rpc_endpoint).map_err(|e| {
            VaultError::Config(format!(
                "network '{}' has invalid RPC URL '{}': {e}",
                network.id, network.rpc_endpoint
            ))
        })?;
        Ok(())
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
