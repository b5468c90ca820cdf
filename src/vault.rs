//! Programmatic entry point.
//!
//! [`Vault`] wires the network registry, the client pool, the wallet store
//! and the transaction engine together behind the operations a wallet UI
//! needs. Inputs are validated before anything is signed or written.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};

use crate::blockchain::{ChainClient, ClientPool};
use crate::config::{validate_config, validate_config_for, ConfigError, VaultConfig};
use crate::error::{VaultError, VaultResult};
use crate::lifecycle::Cancellation;
use crate::network::{NetworkDescriptor, NetworkRegistry};
use crate::resilience::retry_read;
use crate::transaction::{
    parse_address, NativeAmount, TransactionEngine, TransactionRequest, TransactionResult,
};
use crate::wallet::{store, FileStore, KeyMaterial, MemoryStore, PrivateKey, WalletFactory, WalletStore, WordCount};

/// Wallet manager for EVM networks.
#[derive(Clone)]
pub struct Vault {
    config: Arc<VaultConfig>,
    registry: Arc<NetworkRegistry>,
    pool: ClientPool,
    store: Arc<dyn WalletStore>,
    factory: WalletFactory,
}

/// Builder for [`Vault`].
#[derive(Default)]
pub struct VaultBuilder {
    config: Option<VaultConfig>,
    registry: Option<NetworkRegistry>,
    store: Option<Arc<dyn WalletStore>>,
    clients: Vec<(String, Arc<dyn ChainClient>)>,
    word_count: WordCount,
}

impl VaultBuilder {
    pub fn config(mut self, config: VaultConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this registry instead of built-ins plus configured networks.
    pub fn registry(mut self, registry: NetworkRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn store(mut self, store: Arc<dyn WalletStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Serve `network_id` with `client` instead of a JSON-RPC client.
    pub fn client(mut self, network_id: impl Into<String>, client: Arc<dyn ChainClient>) -> Self {
        self.clients.push((network_id.into(), client));
        self
    }

    /// Phrase length for [`Vault::generate_wallet`].
    pub fn word_count(mut self, word_count: WordCount) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn build(self) -> VaultResult<Vault> {
        let config = self.config.unwrap_or_default();

        let registry = match self.registry {
            Some(registry) => {
                validate_config_for(&config, &registry).map_err(ConfigError::Validation)?;
                registry
            }
            None => {
                validate_config(&config).map_err(ConfigError::Validation)?;
                NetworkRegistry::with_overrides(config.networks.clone())?
            }
        };
        registry.resolve(&config.default_network)?;

        let store: Arc<dyn WalletStore> = match (self.store, &config.store.path) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileStore::new(path)),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let pool = ClientPool::new(config.client_settings());
        for (network_id, client) in self.clients {
            let network = registry.resolve(&network_id)?;
            if client.chain_id() != network.chain_id {
                return Err(VaultError::Config(format!(
                    "client for chain {} registered for network '{}' (chain {})",
                    client.chain_id(),
                    network.id,
                    network.chain_id
                )));
            }
            pool.insert(network_id, client);
        }

        tracing::info!(
            networks = registry.len(),
            default_network = %config.default_network,
            "Vault initialized"
        );

        Ok(Vault {
            config: Arc::new(config),
            registry: Arc::new(registry),
            pool,
            store,
            factory: WalletFactory::with_word_count(self.word_count),
        })
    }
}

impl Vault {
    pub fn builder() -> VaultBuilder {
        VaultBuilder::default()
    }

    /// Vault with default configuration and an in-memory store.
    pub fn new() -> VaultResult<Self> {
        Self::builder().build()
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn networks(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn network(&self, network_id: &str) -> VaultResult<&NetworkDescriptor> {
        self.registry.resolve(network_id)
    }

    pub fn default_network(&self) -> VaultResult<&NetworkDescriptor> {
        self.registry.resolve(&self.config.default_network)
    }

    // Key lifecycle

    pub fn generate_wallet(&self) -> VaultResult<KeyMaterial> {
        self.factory.generate()
    }

    pub fn import_from_phrase(&self, phrase: &str) -> VaultResult<KeyMaterial> {
        self.factory.import_from_phrase(phrase)
    }

    pub fn import_from_private_key(&self, key: &str) -> VaultResult<KeyMaterial> {
        self.factory.import_from_private_key(key)
    }

    pub fn save_wallet(&self, material: &KeyMaterial) -> VaultResult<()> {
        store::save(self.store.as_ref(), material)
    }

    pub fn load_wallet(&self) -> VaultResult<Option<KeyMaterial>> {
        store::load(self.store.as_ref())
    }

    /// Forget the stored wallet (logout).
    pub fn clear_wallet(&self) -> VaultResult<()> {
        self.store.clear()?;
        tracing::info!("Wallet record cleared");
        Ok(())
    }

    // Chain access

    /// Client serving `network_id`.
    pub async fn client(&self, network_id: &str) -> VaultResult<Arc<dyn ChainClient>> {
        let network = self.registry.resolve(network_id)?;
        self.pool.get(network).await
    }

    /// Engine sending on `network_id` with the configured settings.
    pub async fn engine(&self, network_id: &str) -> VaultResult<TransactionEngine> {
        let client = self.client(network_id).await?;
        Ok(TransactionEngine::new(client, self.config.engine_settings()))
    }

    /// Native balance of `address`.
    pub async fn get_balance(&self, address: &str, network_id: &str) -> VaultResult<NativeAmount> {
        let address = parse_address(address)?;
        let client = self.client(network_id).await?;
        let wei = retry_read(&self.config.retries, "balance", || client.balance(address)).await?;
        Ok(NativeAmount::from_wei(wei))
    }

    /// Pending transaction count of `address`.
    pub async fn get_nonce(&self, address: &str, network_id: &str) -> VaultResult<u64> {
        let address: Address = parse_address(address)?;
        let client = self.client(network_id).await?;
        let nonce = retry_read(&self.config.retries, "nonce", || client.nonce(address)).await?;
        Ok(nonce)
    }

    /// Sign with a raw hex key and send `amount` to `to`.
    pub async fn send_transaction(
        &self,
        private_key: &str,
        to: &str,
        amount: &str,
        network_id: &str,
    ) -> VaultResult<TransactionResult> {
        let from = KeyMaterial::new(PrivateKey::from_hex(private_key)?, None);
        self.send_from(&from, to, amount, network_id, &Cancellation::new())
            .await
    }

    /// Send from loaded key material; `cancel` stops only the confirmation wait.
    pub async fn send_from(
        &self,
        from: &KeyMaterial,
        to: &str,
        amount: &str,
        network_id: &str,
        cancel: &Cancellation,
    ) -> VaultResult<TransactionResult> {
        let network = self.registry.resolve(network_id)?.clone();
        let engine = self.engine(network_id).await?;
        let request = TransactionRequest::new(from.clone(), to, amount, network);
        engine.send_cancellable(&request, cancel).await
    }

    /// Wait for a previously submitted transaction.
    ///
    /// `timeout` defaults to the configured confirmation timeout.
    pub async fn await_confirmation(
        &self,
        hash: TxHash,
        network_id: &str,
        timeout: Option<Duration>,
        cancel: &Cancellation,
    ) -> VaultResult<TransactionResult> {
        let client = self.client(network_id).await?;
        let mut settings = self.config.engine_settings();
        if let Some(timeout) = timeout {
            settings.confirmation_timeout = timeout;
        }
        TransactionEngine::new(client, settings)
            .await_confirmation(hash, cancel)
            .await
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("default_network", &self.config.default_network)
            .field("networks", &self.registry.ids().collect::<Vec<_>>())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
