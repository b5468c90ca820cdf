//! Node-facing types and transport errors.

use thiserror::Error;

/// Errors that can occur while talking to a node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out after this many milliseconds.
    #[error("RPC timeout after {0} ms")]
    Timeout(u64),

    /// The node answered with an error for a submitted transaction
    /// (insufficient funds, nonce too low, underpriced, ...).
    #[error("rejected by node: {0}")]
    Rejected(String),

    /// Node reports a chain id other than the configured one.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The node answered with something that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ChainError {
    /// Transport-level failures that a read may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Rpc(_) | ChainError::Timeout(_))
    }
}

/// Result type for node operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Inclusion details of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptInfo {
    /// Block the transaction was included in.
    pub block_number: u64,
    /// Execution status (`false` = reverted).
    pub success: bool,
}

/// Outcome of waiting for a transaction to be included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Included and executed successfully.
    Confirmed { block_number: u64 },
    /// Included but execution failed.
    Reverted { block_number: u64 },
    /// Not observed before the deadline. The transaction may still land.
    TimedOut,
}

impl From<ReceiptInfo> for ConfirmationStatus {
    fn from(receipt: ReceiptInfo) -> Self {
        if receipt.success {
            ConfirmationStatus::Confirmed {
                block_number: receipt.block_number,
            }
        } else {
            ConfirmationStatus::Reverted {
                block_number: receipt.block_number,
            }
        }
    }
}
