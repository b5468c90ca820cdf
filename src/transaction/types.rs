//! Send request, send outcome and engine states.

use std::fmt;

use alloy::primitives::TxHash;
use serde::Serialize;

use crate::network::NetworkDescriptor;
use crate::wallet::KeyMaterial;

/// One transfer attempt. Built per send, consumed immediately, never stored.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub from: KeyMaterial,
    /// Recipient, validated during the send.
    pub to: String,
    /// Native-unit decimal, validated during the send.
    pub amount: String,
    pub network: NetworkDescriptor,
}

impl TransactionRequest {
    pub fn new(
        from: KeyMaterial,
        to: impl Into<String>,
        amount: impl Into<String>,
        network: NetworkDescriptor,
    ) -> Self {
        Self {
            from,
            to: to.into(),
            amount: amount.into(),
            network,
        }
    }
}

/// Why a submitted transaction is not (yet) confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    /// No receipt before the confirmation deadline.
    TimedOut,
    /// The caller stopped waiting.
    Cancelled,
    /// Receipt polling failed with a non-transport error. The transaction
    /// was broadcast; poll the hash again later.
    Unobserved,
}

/// Terminal outcome of a send.
///
/// An unconfirmed result still means the node accepted the transaction:
/// it may land later and the hash can be polled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub hash: TxHash,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingReason>,
}

impl TransactionResult {
    pub fn confirmed(hash: TxHash, block_number: u64) -> Self {
        Self {
            hash,
            confirmed: true,
            block_number: Some(block_number),
            pending: None,
        }
    }

    pub fn pending(hash: TxHash, reason: PendingReason) -> Self {
        Self {
            hash,
            confirmed: false,
            block_number: None,
            pending: Some(reason),
        }
    }
}

/// Stages of a send, in order. Any stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Validating,
    Signing,
    Submitting,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

impl fmt::Display for SendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SendState::Validating => "validating",
            SendState::Signing => "signing",
            SendState::Submitting => "submitting",
            SendState::AwaitingConfirmation => "awaiting_confirmation",
            SendState::Confirmed => "confirmed",
            SendState::Failed => "failed",
        };
        f.write_str(name)
    }
}
