//! One shared chain client per network.

use std::sync::Arc;

use dashmap::DashMap;

use crate::blockchain::client::{ChainClient, ClientSettings, RpcChainClient};
use crate::error::VaultResult;
use crate::network::NetworkDescriptor;

/// Lazily built, concurrently shared [`ChainClient`]s keyed by network id.
///
/// Clients that were injected with [`ClientPool::insert`] take precedence
/// and are never replaced by RPC clients.
#[derive(Clone, Default)]
pub struct ClientPool {
    clients: Arc<DashMap<String, Arc<dyn ChainClient>>>,
    settings: ClientSettings,
}

impl ClientPool {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            settings,
        }
    }

    /// Register a client for `network_id`, replacing any existing one.
    pub fn insert(&self, network_id: impl Into<String>, client: Arc<dyn ChainClient>) {
        self.clients.insert(network_id.into(), client);
    }

    /// Client for `network`, building an [`RpcChainClient`] on first use.
    ///
    /// A freshly built client has its chain id checked once; a mismatch is
    /// logged and the client is still returned.
    pub async fn get(&self, network: &NetworkDescriptor) -> VaultResult<Arc<dyn ChainClient>> {
        if let Some(existing) = self.clients.get(&network.id) {
            return Ok(Arc::clone(existing.value()));
        }

        let built: Arc<dyn ChainClient> = Arc::new(RpcChainClient::new(network, self.settings)?);

        // Another task may have raced us; keep whichever landed first.
        let (client, inserted) = {
            let entry = self.clients.entry(network.id.clone());
            match entry {
                dashmap::mapref::entry::Entry::Occupied(o) => (Arc::clone(o.get()), false),
                dashmap::mapref::entry::Entry::Vacant(v) => {
                    v.insert(Arc::clone(&built));
                    (built, true)
                }
            }
        };

        if inserted {
            if let Err(e) = client.verify_chain_id().await {
                tracing::warn!(
                    network = %network.id,
                    error = %e,
                    "Chain verification failed, keeping configured chain id"
                );
            }
        }

        Ok(client)
    }

    pub fn contains(&self, network_id: &str) -> bool {
        self.clients.contains_key(network_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl std::fmt::Debug for ClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        f.debug_struct("ClientPool").field("networks", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::memory::InMemoryChainClient;
    use crate::network::NetworkRegistry;
    use std::time::Duration;

    #[tokio::test]
    async fn test_injected_client_is_returned() {
        let registry = NetworkRegistry::builtin();
        let sepolia = registry.resolve("sepolia").unwrap();

        let pool = ClientPool::default();
        let fake = Arc::new(InMemoryChainClient::new(sepolia.chain_id));
        pool.insert("sepolia", fake.clone());

        let client = pool.get(sepolia).await.unwrap();
        assert_eq!(client.chain_id(), 11_155_111);
        assert_eq!(pool.len(), 1);
        assert_eq!(fake.read_calls(), 0);
    }

    #[tokio::test]
    async fn test_rpc_client_built_once() {
        let mut network = NetworkRegistry::builtin().resolve("sepolia").unwrap().clone();
        network.rpc_endpoint = "http://127.0.0.1:1".to_string();

        let pool = ClientPool::new(ClientSettings {
            request_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
        });
        assert!(pool.is_empty());

        let first = pool.get(&network).await.unwrap();
        let second = pool.get(&network).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(pool.contains("sepolia"));
    }

    #[tokio::test]
    async fn test_bad_endpoint_is_network_unavailable() {
        let mut network = NetworkRegistry::builtin().resolve("polygon").unwrap().clone();
        network.rpc_endpoint = "nonsense".to_string();
        let err = ClientPool::default().get(&network).await.err().unwrap();
        assert!(err.is_transient());
    }
}
