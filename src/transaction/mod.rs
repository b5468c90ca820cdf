//! Native value transfers.
//!
//! # Data Flow
//! ```text
//! TransactionRequest (key material, recipient, decimal amount, network)
//!     → amount.rs / address.rs (parse and validate)
//!     → engine.rs (fresh nonce, balance, gas price; fee reserve check)
//!     → envelope.rs (legacy EIP-155 envelope, deterministic signature)
//!     → ChainClient::submit (once)
//!     → ChainClient::await_confirmation (bounded, cancellable)
//!     → TransactionResult
//! ```

pub mod address;
pub mod amount;
pub mod engine;
pub mod envelope;
pub mod types;

pub use address::{is_valid_address, parse_address};
pub use amount::NativeAmount;
pub use engine::{EngineSettings, TransactionEngine};
pub use envelope::{SignedTransfer, TransferEnvelope, TRANSFER_GAS_LIMIT};
pub use types::{PendingReason, SendState, TransactionRequest, TransactionResult};
