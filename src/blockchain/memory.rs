//! In-process chain used by tests and offline tooling.
//!
//! Behaves like a single node with scripted state: balances, nonces and the
//! gas price are set by the caller, submissions are recorded verbatim, and
//! receipts appear according to the configured [`ConfirmationMode`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainResult, ReceiptInfo};

/// How submitted transactions get mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMode {
    /// Receipt available on the first poll.
    Immediate,
    /// Receipt available after this many empty polls.
    AfterPolls(u32),
    /// Included with a failed status.
    Revert,
    /// Never mined.
    Never,
}

#[derive(Debug)]
struct State {
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    gas_price: u128,
    remote_chain_id: u64,
    block_number: u64,
    confirmation: ConfirmationMode,
    reject_with: Option<String>,
    transient_failures: u32,
    lost_submit_response: Option<ChainError>,
    receipt_failure: Option<ChainError>,
    submitted: Vec<Bytes>,
    pending_polls: HashMap<TxHash, u32>,
    read_calls: u64,
}

/// Deterministic [`ChainClient`] with no I/O.
///
/// Transaction hashes are `keccak256(raw)`, same as a real node computes
/// for a signed envelope.
#[derive(Debug)]
pub struct InMemoryChainClient {
    chain_id: u64,
    poll_interval: Duration,
    state: Mutex<State>,
}

impl InMemoryChainClient {
    /// Empty chain: zero balances, 1 gwei gas price, immediate confirmation.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            poll_interval: Duration::from_millis(10),
            state: Mutex::new(State {
                balances: HashMap::new(),
                nonces: HashMap::new(),
                gas_price: 1_000_000_000,
                remote_chain_id: chain_id,
                block_number: 1,
                confirmation: ConfirmationMode::Immediate,
                reject_with: None,
                transient_failures: 0,
                lost_submit_response: None,
                receipt_failure: None,
                submitted: Vec::new(),
                pending_polls: HashMap::new(),
                read_calls: 0,
            }),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.state().balances.insert(address, wei);
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state().nonces.insert(address, nonce);
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.state().gas_price = wei;
    }

    /// Make the node report a different chain id than the configured one.
    pub fn set_remote_chain_id(&self, chain_id: u64) {
        self.state().remote_chain_id = chain_id;
    }

    pub fn set_confirmation_mode(&self, mode: ConfirmationMode) {
        self.state().confirmation = mode;
    }

    /// Reject every following submission with `reason`.
    pub fn reject_submissions(&self, reason: impl Into<String>) {
        self.state().reject_with = Some(reason.into());
    }

    /// Fail the next `count` calls (reads and submissions) with a transport error.
    pub fn fail_next(&self, count: u32) {
        self.state().transient_failures = count;
    }

    /// Accept following submissions but answer them with `error`, as if the
    /// response was lost on the way back.
    pub fn lose_submit_responses(&self, error: ChainError) {
        self.state().lost_submit_response = Some(error);
    }

    /// Fail every following receipt lookup with `error`; `None` clears it.
    pub fn fail_receipts_with(&self, error: Option<ChainError>) {
        self.state().receipt_failure = error;
    }

    /// Raw payloads accepted or rejected by `submit`, in order.
    pub fn submitted(&self) -> Vec<Bytes> {
        self.state().submitted.clone()
    }

    /// Number of read calls served so far, failed ones included.
    pub fn read_calls(&self) -> u64 {
        self.state().read_calls
    }

    fn begin_read(&self) -> ChainResult<MutexGuard<'_, State>> {
        let mut state = self.state();
        state.read_calls += 1;
        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(ChainError::Rpc("injected transport failure".into()));
        }
        Ok(state)
    }
}

#[async_trait]
impl ChainClient for InMemoryChainClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn remote_chain_id(&self) -> ChainResult<u64> {
        Ok(self.begin_read()?.remote_chain_id)
    }

    async fn balance(&self, address: Address) -> ChainResult<U256> {
        let state = self.begin_read()?;
        Ok(state.balances.get(&address).copied().unwrap_or_default())
    }

    async fn nonce(&self, address: Address) -> ChainResult<u64> {
        let state = self.begin_read()?;
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn gas_price(&self) -> ChainResult<u128> {
        Ok(self.begin_read()?.gas_price)
    }

    async fn submit(&self, raw: Bytes) -> ChainResult<TxHash> {
        let mut state = self.state();
        state.submitted.push(raw.clone());

        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(ChainError::Rpc("injected transport failure".into()));
        }
        if let Some(reason) = &state.reject_with {
            return Err(ChainError::Rejected(reason.clone()));
        }

        let hash = keccak256(&raw);
        let polls = match state.confirmation {
            ConfirmationMode::AfterPolls(n) => n,
            _ => 0,
        };
        state.pending_polls.insert(hash, polls);
        match &state.lost_submit_response {
            Some(error) => Err(error.clone()),
            None => Ok(hash),
        }
    }

    async fn receipt(&self, hash: TxHash) -> ChainResult<Option<ReceiptInfo>> {
        let mut state = self.begin_read()?;
        if let Some(error) = &state.receipt_failure {
            return Err(error.clone());
        }
        let mode = state.confirmation;

        let Some(remaining) = state.pending_polls.get_mut(&hash) else {
            return Ok(None);
        };
        if *remaining > 0 {
            *remaining -= 1;
            return Ok(None);
        }

        match mode {
            ConfirmationMode::Never => Ok(None),
            ConfirmationMode::Revert => Ok(Some(ReceiptInfo {
                block_number: state.block_number,
                success: false,
            })),
            ConfirmationMode::Immediate | ConfirmationMode::AfterPolls(_) => {
                state.block_number += 1;
                Ok(Some(ReceiptInfo {
                    block_number: state.block_number,
                    success: true,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::ConfirmationStatus;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn test_scripted_reads() {
        let chain = InMemoryChainClient::new(1);
        chain.set_balance(addr(1), U256::from(5u64));
        chain.set_nonce(addr(1), 9);
        chain.set_gas_price(7);

        assert_eq!(chain.balance(addr(1)).await, Ok(U256::from(5u64)));
        assert_eq!(chain.balance(addr(2)).await, Ok(U256::ZERO));
        assert_eq!(chain.nonce(addr(1)).await, Ok(9));
        assert_eq!(chain.gas_price().await, Ok(7));
        assert_eq!(chain.read_calls(), 4);
    }

    #[tokio::test]
    async fn test_hash_is_keccak_of_payload() {
        let chain = InMemoryChainClient::new(1);
        let raw = Bytes::from_static(b"\x01\x02\x03");
        let hash = chain.submit(raw.clone()).await.unwrap();
        assert_eq!(hash, keccak256(&raw));
        assert_eq!(chain.submitted(), vec![raw]);
    }

    #[tokio::test]
    async fn test_rejection_is_recorded() {
        let chain = InMemoryChainClient::new(1);
        chain.reject_submissions("nonce too low");
        let err = chain.submit(Bytes::from_static(b"x")).await.unwrap_err();
        assert_eq!(err, ChainError::Rejected("nonce too low".into()));
        assert_eq!(chain.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_consumed() {
        let chain = InMemoryChainClient::new(1);
        chain.fail_next(2);
        assert!(chain.gas_price().await.unwrap_err().is_transient());
        assert!(chain.gas_price().await.is_err());
        assert!(chain.gas_price().await.is_ok());
    }

    #[tokio::test]
    async fn test_confirmation_after_polls() {
        let chain = InMemoryChainClient::new(1);
        chain.set_confirmation_mode(ConfirmationMode::AfterPolls(2));
        let hash = chain.submit(Bytes::from_static(b"tx")).await.unwrap();

        assert_eq!(chain.receipt(hash).await, Ok(None));
        assert_eq!(chain.receipt(hash).await, Ok(None));
        let receipt = chain.receipt(hash).await.unwrap().unwrap();
        assert!(receipt.success);
    }

    #[tokio::test]
    async fn test_await_confirmation_reverted() {
        let chain = InMemoryChainClient::new(1);
        chain.set_confirmation_mode(ConfirmationMode::Revert);
        let hash = chain.submit(Bytes::from_static(b"tx")).await.unwrap();
        let status = chain
            .await_confirmation(hash, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(matches!(status, ConfirmationStatus::Reverted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_confirmation_times_out() {
        let chain = InMemoryChainClient::new(1);
        chain.set_confirmation_mode(ConfirmationMode::Never);
        let hash = chain.submit(Bytes::from_static(b"tx")).await.unwrap();
        let status = chain
            .await_confirmation(hash, Duration::from_secs(180))
            .await
            .unwrap();
        assert_eq!(status, ConfirmationStatus::TimedOut);
    }

    #[tokio::test]
    async fn test_await_confirmation_survives_transient_poll_errors() {
        let chain = InMemoryChainClient::new(1);
        let hash = chain.submit(Bytes::from_static(b"tx")).await.unwrap();
        chain.fail_next(3);
        let status = chain
            .await_confirmation(hash, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(status, ConfirmationStatus::Confirmed { .. }));
    }

    #[tokio::test]
    async fn test_lost_submit_response_still_lands() {
        let chain = InMemoryChainClient::new(1);
        chain.lose_submit_responses(ChainError::Timeout(10_000));
        let raw = Bytes::from_static(b"tx");

        assert_eq!(chain.submit(raw.clone()).await, Err(ChainError::Timeout(10_000)));
        let receipt = chain.receipt(keccak256(&raw)).await.unwrap();
        assert!(receipt.is_some());
    }

    #[tokio::test]
    async fn test_receipt_failure_aborts_wait() {
        let chain = InMemoryChainClient::new(1);
        let hash = chain.submit(Bytes::from_static(b"tx")).await.unwrap();
        chain.fail_receipts_with(Some(ChainError::InvalidResponse("no block number".into())));

        let err = chain
            .await_confirmation(hash, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidResponse(_)));

        chain.fail_receipts_with(None);
        assert!(chain.receipt(hash).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_verify_chain_id_mismatch() {
        let chain = InMemoryChainClient::new(11_155_111);
        assert!(chain.verify_chain_id().await.is_ok());

        chain.set_remote_chain_id(1);
        let err = chain.verify_chain_id().await.unwrap_err();
        assert_eq!(
            err,
            ChainError::ChainMismatch {
                expected: 11_155_111,
                actual: 1
            }
        );
    }
}
