//! Non-custodial wallet core for EVM networks.
//!
//! Generates and imports key material, reads balances across configured
//! networks, and signs, broadcasts and confirms native value transfers.
//! Private keys and recovery phrases stay in process memory, are wiped on
//! drop and never reach logs or error messages.
//!
//! [`Vault`] is the entry point; the modules below are usable on their own.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod resilience;
pub mod transaction;
pub mod vault;
pub mod wallet;

pub use blockchain::{ChainClient, ChainError, InMemoryChainClient, RpcChainClient};
pub use config::VaultConfig;
pub use error::{VaultError, VaultResult};
pub use lifecycle::Cancellation;
pub use network::{NetworkDescriptor, NetworkRegistry};
pub use transaction::{NativeAmount, PendingReason, TransactionRequest, TransactionResult};
pub use vault::{Vault, VaultBuilder};
pub use wallet::{KeyMaterial, WalletFactory, WalletStore};
