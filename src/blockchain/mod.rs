//! Chain access subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkDescriptor (rpc endpoint, chain id)
//!     → pool.rs (one shared client per network)
//!     → client.rs (ChainClient: timeouts, read failover, receipt polling)
//!     → node JSON-RPC
//!
//! Tests and offline use swap in memory.rs behind the same trait.
//! ```
//!
//! # Constraints
//! - Every RPC call is bounded by a timeout
//! - Submission goes to the primary endpoint once, never retried
//! - The configured chain id is authoritative; node disagreement is logged

pub mod client;
pub mod memory;
pub mod pool;
pub mod types;

pub use client::{ChainClient, ClientSettings, RpcChainClient};
pub use memory::{ConfirmationMode, InMemoryChainClient};
pub use pool::ClientPool;
pub use types::{ChainError, ChainResult, ConfirmationStatus, ReceiptInfo};
