//! Crate-wide error taxonomy.
//!
//! Every failing operation in the public API returns a [`VaultError`].
//! Variant payloads carry human-readable context but never key material:
//! private keys and recovery phrases are not echoed back, even when they
//! were the malformed input.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::blockchain::ChainError;

/// Errors surfaced by the wallet core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Recovery phrase failed word-count, wordlist or checksum validation.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Raw private key is not 32 bytes of hex or not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Destination or query address failed format or checksum validation.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Amount is not a non-negative decimal within 18 decimal places.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Network id is not present in the registry.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// Balance does not cover the amount plus the fee reserve.
    ///
    /// Advisory: the node has the final word, this only stops sends that
    /// are certain to fail.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Available balance, native-unit decimal.
        have: String,
        /// Amount plus fee reserve, native-unit decimal.
        need: String,
    },

    /// The node rejected the signed transaction.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// The transport failed while broadcasting, so the node may or may not
    /// have the transaction. Check `hash` before sending again.
    #[error("submission of {hash} unconfirmed: {reason}")]
    SubmissionUnknown {
        hash: TxHash,
        reason: String,
    },

    /// The node could not be reached (transient).
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The node answered with data that could not be interpreted.
    #[error("invalid node response: {0}")]
    InvalidResponse(String),

    /// The transaction was included but execution failed.
    #[error("transaction {0} reverted")]
    TransactionReverted(TxHash),

    /// Local signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The wallet store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored wallet record is inconsistent or unreadable.
    #[error("corrupted wallet record: {0}")]
    CorruptedRecord(String),

    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, VaultError::NetworkUnavailable(_))
    }
}

impl From<ChainError> for VaultError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rejected(reason) => VaultError::SubmissionFailed(reason),
            ChainError::InvalidResponse(reason) => VaultError::InvalidResponse(reason),
            mismatch @ ChainError::ChainMismatch { .. } => VaultError::Config(mismatch.to_string()),
            transport @ (ChainError::Rpc(_) | ChainError::Timeout(_)) => {
                VaultError::NetworkUnavailable(transport.to_string())
            }
        }
    }
}

/// Result type for wallet core operations.
pub type VaultResult<T> = Result<T, VaultError>;
