//! Node access: the [`ChainClient`] capability and its JSON-RPC implementation.
//!
//! # Responsibilities
//! - Query account state (balance, pending nonce) and the provider gas price
//! - Submit signed raw transactions
//! - Poll for receipts until inclusion or deadline
//! - Bound every RPC call with a timeout and fail over between read endpoints

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::TransportError;
use async_trait::async_trait;
use tokio::time::timeout;

use crate::blockchain::types::{ChainError, ChainResult, ConfirmationStatus, ReceiptInfo};
use crate::network::NetworkDescriptor;
use crate::observability::metrics;

/// Capability to talk to one EVM network.
///
/// Implementations must be cheap to share (`Arc<dyn ChainClient>`) and safe
/// to call from independent tasks.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Chain id this client signs for. Configuration, not a node answer.
    fn chain_id(&self) -> u64;

    /// Delay between receipt polls in [`ChainClient::await_confirmation`].
    fn poll_interval(&self) -> Duration;

    /// Chain id reported by the node.
    async fn remote_chain_id(&self) -> ChainResult<u64>;

    /// Balance in wei.
    async fn balance(&self, address: Address) -> ChainResult<U256>;

    /// Pending transaction count, fetched fresh on every call.
    async fn nonce(&self, address: Address) -> ChainResult<u64>;

    /// Provider default gas price in wei.
    async fn gas_price(&self) -> ChainResult<u128>;

    /// Broadcast a signed transaction. Never retried.
    async fn submit(&self, raw: Bytes) -> ChainResult<TxHash>;

    /// Inclusion details, `None` while the transaction is unmined.
    async fn receipt(&self, hash: TxHash) -> ChainResult<Option<ReceiptInfo>>;

    /// Check the node serves the configured chain.
    async fn verify_chain_id(&self) -> ChainResult<()> {
        let actual = self.remote_chain_id().await?;
        if actual != self.chain_id() {
            return Err(ChainError::ChainMismatch {
                expected: self.chain_id(),
                actual,
            });
        }
        Ok(())
    }

    /// Poll for a receipt until it shows up or `deadline` elapses.
    ///
    /// Running out of time yields [`ConfirmationStatus::TimedOut`], not an
    /// error. Transient poll failures are logged and polling continues;
    /// anything else aborts the wait.
    async fn await_confirmation(
        &self,
        hash: TxHash,
        deadline: Duration,
    ) -> ChainResult<ConfirmationStatus> {
        let every = self.poll_interval().max(Duration::from_millis(1));

        let poll = async {
            let mut ticker = tokio::time::interval(every);
            let mut polls: u64 = 0;
            loop {
                ticker.tick().await;
                polls += 1;
                match self.receipt(hash).await {
                    Ok(Some(receipt)) => {
                        tracing::debug!(tx_hash = %hash, polls, "Receipt found");
                        return Ok(ConfirmationStatus::from(receipt));
                    }
                    Ok(None) => {}
                    Err(e) if e.is_transient() => {
                        tracing::warn!(tx_hash = %hash, error = %e, "Receipt poll failed, continuing");
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match timeout(deadline, poll).await {
            Ok(result) => result,
            Err(_) => {
                tracing::info!(
                    tx_hash = %hash,
                    timeout_secs = deadline.as_secs(),
                    "Confirmation wait timed out"
                );
                Ok(ConfirmationStatus::TimedOut)
            }
        }
    }
}

/// Timing knobs for [`RpcChainClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// Upper bound for a single RPC call.
    pub request_timeout: Duration,
    /// Receipt polling period.
    pub poll_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(2),
        }
    }
}

type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// JSON-RPC client over alloy HTTP providers.
///
/// Reads go to the primary endpoint first and fall over to the configured
/// failover endpoints. Submission only ever goes to the primary.
#[derive(Clone)]
pub struct RpcChainClient {
    network_id: String,
    chain_id: u64,
    endpoint: String,
    primary: SharedProvider,
    failovers: Vec<SharedProvider>,
    settings: ClientSettings,
}

impl RpcChainClient {
    /// Build a client for `network`. Does not touch the network.
    pub fn new(network: &NetworkDescriptor, settings: ClientSettings) -> ChainResult<Self> {
        let primary_url: url::Url = network.rpc_endpoint.parse().map_err(|e| {
            ChainError::Rpc(format!(
                "invalid RPC URL '{}': {}",
                network.rpc_endpoint, e
            ))
        })?;
        let primary: SharedProvider = Arc::new(ProviderBuilder::new().connect_http(primary_url));

        let mut failovers = Vec::new();
        for url_str in &network.failover_endpoints {
            match url_str.parse::<url::Url>() {
                Ok(url) => {
                    failovers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as SharedProvider)
                }
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::debug!(
            network = %network.id,
            rpc_url = %network.rpc_endpoint,
            failovers = failovers.len(),
            chain_id = network.chain_id,
            "RPC client created"
        );

        Ok(Self {
            network_id: network.id.clone(),
            chain_id: network.chain_id,
            endpoint: network.rpc_endpoint.clone(),
            primary,
            failovers,
            settings,
        })
    }

    /// Build a client and check the node's chain id.
    ///
    /// A mismatch or an unreachable node is logged, not fatal: the
    /// configured chain id is still the one used for signing.
    pub async fn connect(network: &NetworkDescriptor, settings: ClientSettings) -> ChainResult<Self> {
        let client = Self::new(network, settings)?;
        match client.verify_chain_id().await {
            Ok(()) => tracing::info!(
                network = %client.network_id,
                chain_id = client.chain_id,
                "Chain client initialized"
            ),
            Err(e) => tracing::warn!(
                network = %client.network_id,
                error = %e,
                "Chain client initialized but chain verification failed"
            ),
        }
        Ok(client)
    }

    /// Network id this client was built for.
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.settings.request_timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Run an idempotent read against each endpoint in turn.
    async fn read<T, F, Fut>(&self, operation: &'static str, call: F) -> ChainResult<T>
    where
        F: Fn(SharedProvider) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let mut last = ChainError::Rpc(format!("{operation}: no endpoints"));

        for (i, provider) in std::iter::once(&self.primary)
            .chain(self.failovers.iter())
            .enumerate()
        {
            match timeout(self.settings.request_timeout, call(Arc::clone(provider))).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    metrics::record_rpc_error(&self.network_id, operation, "rpc");
                    tracing::warn!(
                        network = %self.network_id,
                        provider_idx = i,
                        operation,
                        error = %e,
                        "RPC error, trying next provider"
                    );
                    last = ChainError::Rpc(format!("{operation}: {e}"));
                }
                Err(_) => {
                    metrics::record_rpc_error(&self.network_id, operation, "timeout");
                    tracing::warn!(
                        network = %self.network_id,
                        provider_idx = i,
                        operation,
                        "RPC timeout, trying next provider"
                    );
                    last = ChainError::Timeout(self.timeout_ms());
                }
            }
        }

        Err(last)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn poll_interval(&self) -> Duration {
        self.settings.poll_interval
    }

    async fn remote_chain_id(&self) -> ChainResult<u64> {
        self.read("chain_id", |p| async move { p.get_chain_id().await })
            .await
    }

    async fn balance(&self, address: Address) -> ChainResult<U256> {
        self.read("balance", |p| async move { p.get_balance(address).await })
            .await
    }

    async fn nonce(&self, address: Address) -> ChainResult<u64> {
        self.read("nonce", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn gas_price(&self) -> ChainResult<u128> {
        self.read("gas_price", |p| async move { p.get_gas_price().await })
            .await
    }

    async fn submit(&self, raw: Bytes) -> ChainResult<TxHash> {
        match timeout(
            self.settings.request_timeout,
            self.primary.send_raw_transaction(&raw),
        )
        .await
        {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            Ok(Err(e)) => match e.as_error_resp() {
                // The node answered: the transaction itself was refused.
                Some(resp) => Err(ChainError::Rejected(resp.message.to_string())),
                None => {
                    metrics::record_rpc_error(&self.network_id, "submit", "rpc");
                    Err(ChainError::Rpc(format!("submit: {e}")))
                }
            },
            Err(_) => {
                metrics::record_rpc_error(&self.network_id, "submit", "timeout");
                Err(ChainError::Timeout(self.timeout_ms()))
            }
        }
    }

    async fn receipt(&self, hash: TxHash) -> ChainResult<Option<ReceiptInfo>> {
        let receipt = self
            .read("receipt", |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;

        match receipt {
            None => Ok(None),
            Some(r) => {
                let block_number = r.block_number().ok_or_else(|| {
                    ChainError::InvalidResponse(format!("receipt for {hash} has no block number"))
                })?;
                Ok(Some(ReceiptInfo {
                    block_number,
                    success: r.status(),
                }))
            }
        }
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("network", &self.network_id)
            .field("rpc_url", &self.endpoint)
            .field("chain_id", &self.chain_id)
            .field("failovers", &self.failovers.len())
            .field("timeout_ms", &self.timeout_ms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkRegistry;

    fn local_network(rpc: &str, failovers: Vec<String>) -> NetworkDescriptor {
        let mut network = NetworkRegistry::builtin()
            .resolve("sepolia")
            .unwrap()
            .clone();
        network.rpc_endpoint = rpc.to_string();
        network.failover_endpoints = failovers;
        network
    }

    fn fast_settings() -> ClientSettings {
        ClientSettings {
            request_timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_invalid_primary_url() {
        let network = local_network("not a url", Vec::new());
        let err = RpcChainClient::new(&network, fast_settings()).unwrap_err();
        assert!(matches!(err, ChainError::Rpc(msg) if msg.contains("invalid RPC URL")));
    }

    #[test]
    fn test_invalid_failover_is_skipped() {
        let network = local_network(
            "http://127.0.0.1:1",
            vec!["::nope::".to_string(), "http://127.0.0.1:2".to_string()],
        );
        let client = RpcChainClient::new(&network, fast_settings()).unwrap();
        assert_eq!(client.failovers.len(), 1);
        assert_eq!(client.chain_id(), 11_155_111);
        assert_eq!(client.network_id(), "sepolia");
    }

    #[tokio::test]
    async fn test_connect_tolerates_unreachable_node() {
        let network = local_network("http://127.0.0.1:1", Vec::new());
        let client = RpcChainClient::connect(&network, fast_settings()).await;
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_reads_fail_over_then_error() {
        let network = local_network(
            "http://127.0.0.1:1",
            vec!["http://127.0.0.1:2".to_string()],
        );
        let client = RpcChainClient::new(&network, fast_settings()).unwrap();
        let err = client.gas_price().await.unwrap_err();
        assert!(err.is_transient(), "{err:?}");
    }

    #[tokio::test]
    async fn test_subsecond_timeout_reported_in_ms() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let network = local_network(&format!("http://{addr}"), Vec::new());
        let client = RpcChainClient::new(&network, fast_settings()).unwrap();
        let err = client.gas_price().await.unwrap_err();
        assert_eq!(err, ChainError::Timeout(500));
        assert_eq!(err.to_string(), "RPC timeout after 500 ms");
    }

    #[test]
    fn test_debug_shows_endpoint() {
        let network = local_network("http://127.0.0.1:8545", Vec::new());
        let client = RpcChainClient::new(&network, fast_settings()).unwrap();
        let rendered = format!("{client:?}");
        assert!(rendered.contains("127.0.0.1:8545"));
        assert!(rendered.contains("11155111"));
    }
}
