//! Validate → sign → submit → confirm.
//!
//! # Guarantees
//! - Nothing is signed before the amount, recipient and balance check pass
//! - Submission happens at most once per send
//! - The configured chain id, not the node's, goes into the signature
//! - After submission the hash is never lost: timeouts, cancellation and
//!   unreadable receipts are pending results, a transport failure during
//!   the broadcast is `SubmissionUnknown` carrying the hash

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::TxHash;
use uuid::Uuid;

use crate::blockchain::{ChainClient, ChainError, ConfirmationStatus};
use crate::error::{VaultError, VaultResult};
use crate::lifecycle::Cancellation;
use crate::observability::metrics;
use crate::resilience::{retry_read, RetryPolicy};
use crate::transaction::address::parse_address;
use crate::transaction::amount::NativeAmount;
use crate::transaction::envelope::{SignedTransfer, TransferEnvelope, TRANSFER_GAS_LIMIT};
use crate::transaction::types::{PendingReason, SendState, TransactionRequest, TransactionResult};

/// Tunables for [`TransactionEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub gas_limit: u64,
    pub confirmation_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            gas_limit: TRANSFER_GAS_LIMIT,
            confirmation_timeout: Duration::from_secs(180),
            retry: RetryPolicy::default(),
        }
    }
}

/// Runs sends against one network's [`ChainClient`].
///
/// Sends are independent; the engine keeps no per-account state. Two
/// concurrent sends from the same account will read the same nonce, so
/// callers must keep one send in flight per account.
#[derive(Clone)]
pub struct TransactionEngine {
    client: Arc<dyn ChainClient>,
    settings: EngineSettings,
}

impl TransactionEngine {
    pub fn new(client: Arc<dyn ChainClient>, settings: EngineSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validate and sign without touching the network's state.
    ///
    /// Reads nonce, balance and gas price (with retries on transient
    /// errors). Fails with `InsufficientFunds` when the balance does not
    /// cover `amount + gas_limit × gas_price`.
    pub async fn prepare(&self, request: &TransactionRequest) -> VaultResult<SignedTransfer> {
        let attempt = Uuid::new_v4();
        self.prepare_attempt(attempt, request).await
    }

    /// Full send, waiting up to the configured timeout for inclusion.
    pub async fn send(&self, request: &TransactionRequest) -> VaultResult<TransactionResult> {
        self.send_cancellable(request, &Cancellation::new()).await
    }

    /// Full send whose confirmation wait stops early when `cancel` fires.
    ///
    /// Cancellation before submission has no effect; the transaction is
    /// never withdrawn once broadcast.
    pub async fn send_cancellable(
        &self,
        request: &TransactionRequest,
        cancel: &Cancellation,
    ) -> VaultResult<TransactionResult> {
        let attempt = Uuid::new_v4();
        let network = request.network.id.as_str();

        let signed = self.prepare_attempt(attempt, request).await?;

        self.transition(attempt, SendState::Submitting);
        let hash = match self.client.submit(signed.raw.clone()).await {
            Ok(hash) => hash,
            Err(ChainError::Rejected(reason)) => {
                metrics::record_transaction(network, "rejected");
                self.fail(attempt, &reason);
                return Err(VaultError::SubmissionFailed(reason));
            }
            Err(e) => {
                // The payload may have reached the node before the transport failed.
                metrics::record_transaction(network, "unknown");
                self.fail(attempt, &e.to_string());
                tracing::warn!(
                    %attempt,
                    tx_hash = %signed.hash,
                    error = %e,
                    "Submission outcome unknown, check the hash before resending"
                );
                return Err(VaultError::SubmissionUnknown {
                    hash: signed.hash,
                    reason: e.to_string(),
                });
            }
        };

        if hash != signed.hash {
            tracing::warn!(
                %attempt,
                expected = %signed.hash,
                reported = %hash,
                "Node reported a different transaction hash"
            );
        }
        tracing::info!(
            %attempt,
            network,
            tx_hash = %hash,
            nonce = signed.envelope.nonce,
            "Transaction submitted"
        );

        self.transition(attempt, SendState::AwaitingConfirmation);
        let result = self.confirm_attempt(attempt, hash, cancel).await;
        let outcome = match &result {
            Ok(r) if r.confirmed => "confirmed",
            Ok(_) => "pending",
            Err(VaultError::TransactionReverted(_)) => "reverted",
            Err(_) => "failed",
        };
        metrics::record_transaction(network, outcome);
        result
    }

    /// Wait for an already submitted transaction.
    pub async fn await_confirmation(
        &self,
        hash: TxHash,
        cancel: &Cancellation,
    ) -> VaultResult<TransactionResult> {
        self.confirm_attempt(Uuid::new_v4(), hash, cancel).await
    }

    async fn prepare_attempt(
        &self,
        attempt: Uuid,
        request: &TransactionRequest,
    ) -> VaultResult<SignedTransfer> {
        self.transition(attempt, SendState::Validating);
        let result = self.validate_and_sign(attempt, request).await;
        if let Err(e) = &result {
            self.fail(attempt, &e.to_string());
        }
        result
    }

    async fn validate_and_sign(
        &self,
        attempt: Uuid,
        request: &TransactionRequest,
    ) -> VaultResult<SignedTransfer> {
        let amount = NativeAmount::parse(&request.amount)?;
        let to = parse_address(&request.to)?;
        let from = request.from.address();
        let retry = &self.settings.retry;

        if self.client.chain_id() != request.network.chain_id {
            return Err(VaultError::Config(format!(
                "client for chain {} used for network '{}' (chain {})",
                self.client.chain_id(),
                request.network.id,
                request.network.chain_id
            )));
        }

        let nonce = retry_read(retry, "nonce", || self.client.nonce(from)).await?;
        let balance = retry_read(retry, "balance", || self.client.balance(from)).await?;
        let gas_price = retry_read(retry, "gas_price", || self.client.gas_price()).await?;

        let envelope = TransferEnvelope {
            to,
            value: amount.wei(),
            nonce,
            chain_id: request.network.chain_id,
            gas_price,
            gas_limit: self.settings.gas_limit,
        };

        let need = envelope
            .value
            .checked_add(envelope.max_fee())
            .ok_or_else(|| VaultError::InvalidAmount("amount plus fee overflows".into()))?;
        if need > balance {
            return Err(VaultError::InsufficientFunds {
                have: NativeAmount::from_wei(balance).to_string(),
                need: NativeAmount::from_wei(need).to_string(),
            });
        }

        tracing::debug!(
            %attempt,
            from = %from,
            to = %to,
            amount = %amount,
            nonce,
            gas_price,
            gas_limit = envelope.gas_limit,
            "Transfer validated"
        );

        self.transition(attempt, SendState::Signing);
        envelope.sign(request.from.private_key())
    }

    async fn confirm_attempt(
        &self,
        attempt: Uuid,
        hash: TxHash,
        cancel: &Cancellation,
    ) -> VaultResult<TransactionResult> {
        let status = tokio::select! {
            status = self.client.await_confirmation(hash, self.settings.confirmation_timeout) => status,
            _ = cancel.cancelled() => {
                tracing::info!(%attempt, tx_hash = %hash, "Confirmation wait cancelled");
                return Ok(TransactionResult::pending(hash, PendingReason::Cancelled));
            }
        };

        match status {
            Ok(ConfirmationStatus::Confirmed { block_number }) => {
                self.transition(attempt, SendState::Confirmed);
                tracing::info!(%attempt, tx_hash = %hash, block_number, "Transaction confirmed");
                Ok(TransactionResult::confirmed(hash, block_number))
            }
            Ok(ConfirmationStatus::Reverted { block_number }) => {
                self.fail(attempt, "reverted");
                tracing::warn!(%attempt, tx_hash = %hash, block_number, "Transaction reverted");
                Err(VaultError::TransactionReverted(hash))
            }
            Ok(ConfirmationStatus::TimedOut) => {
                tracing::info!(%attempt, tx_hash = %hash, "Transaction still pending");
                Ok(TransactionResult::pending(hash, PendingReason::TimedOut))
            }
            Err(e) => {
                tracing::warn!(
                    %attempt,
                    tx_hash = %hash,
                    error = %e,
                    "Receipt polling failed, transaction left pending"
                );
                Ok(TransactionResult::pending(hash, PendingReason::Unobserved))
            }
        }
    }

    fn transition(&self, attempt: Uuid, state: SendState) {
        tracing::debug!(%attempt, %state, "Send state");
    }

    fn fail(&self, attempt: Uuid, reason: &str) {
        tracing::debug!(%attempt, state = %SendState::Failed, reason, "Send state");
    }
}
