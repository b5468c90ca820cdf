//! Legacy EIP-155 transfer envelopes and local signing.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

use crate::error::{VaultError, VaultResult};
use crate::wallet::PrivateKey;

/// Gas consumed by a plain value transfer to an externally owned account.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Balance that must stay available for fees: `gas_limit × gas_price`.
pub fn fee_reserve(gas_limit: u64, gas_price: u128) -> U256 {
    U256::from(gas_limit) * U256::from(gas_price)
}

/// Unsigned native value transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEnvelope {
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// A signed transfer ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// EIP-2718 encoding (plain RLP for legacy transactions).
    pub raw: Bytes,
    /// `keccak256(raw)`.
    pub hash: TxHash,
    pub envelope: TransferEnvelope,
}

impl TransferEnvelope {
    /// Worst-case fee: `gas_limit × gas_price`.
    pub fn max_fee(&self) -> U256 {
        fee_reserve(self.gas_limit, self.gas_price)
    }

    /// Sign with RFC-6979 deterministic ECDSA over the EIP-155 payload.
    pub fn sign(&self, key: &PrivateKey) -> VaultResult<SignedTransfer> {
        let mut tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: Bytes::new(),
        };

        let signature = key
            .signer()
            .sign_transaction_sync(&mut tx)
            .map_err(|e| VaultError::Signing(e.to_string()))?;

        let envelope = TxEnvelope::Legacy(tx.into_signed(signature));
        let raw = Bytes::from(envelope.encoded_2718());
        let hash = *envelope.tx_hash();

        Ok(SignedTransfer {
            raw,
            hash,
            envelope: *self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::transaction::SignerRecoverable;
    use alloy::consensus::Transaction;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{address, hex, keccak256};

    // Worked example from EIP-155.
    fn eip155_example() -> (PrivateKey, TransferEnvelope) {
        let key = PrivateKey::from_hex(&"46".repeat(32)).unwrap();
        let envelope = TransferEnvelope {
            to: address!("3535353535353535353535353535353535353535"),
            value: U256::from(10u128.pow(18)),
            nonce: 9,
            chain_id: 1,
            gas_price: 20_000_000_000,
            gas_limit: TRANSFER_GAS_LIMIT,
        };
        (key, envelope)
    }

    #[test]
    fn test_eip155_vector() {
        let (key, envelope) = eip155_example();
        let signed = envelope.sign(&key).unwrap();
        assert_eq!(
            hex::encode(&signed.raw),
            "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
        );
        assert_eq!(signed.hash, keccak256(&signed.raw));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let (key, envelope) = eip155_example();
        assert_eq!(envelope.sign(&key).unwrap(), envelope.sign(&key).unwrap());
    }

    #[test]
    fn test_signer_recovers_to_sender() {
        let (key, mut envelope) = eip155_example();
        envelope.chain_id = 11_155_111;
        let signed = envelope.sign(&key).unwrap();

        let decoded = TxEnvelope::decode_2718(&mut &signed.raw[..]).unwrap();
        assert_eq!(decoded.recover_signer().unwrap(), key.address());
        assert_eq!(decoded.chain_id(), Some(11_155_111));
    }

    #[test]
    fn test_chain_id_changes_signature() {
        let (key, envelope) = eip155_example();
        let mainnet = envelope.sign(&key).unwrap();
        let other = TransferEnvelope { chain_id: 137, ..envelope }.sign(&key).unwrap();
        assert_ne!(mainnet.raw, other.raw);
        assert_ne!(mainnet.hash, other.hash);
    }

    #[test]
    fn test_max_fee() {
        let (_, envelope) = eip155_example();
        assert_eq!(envelope.max_fee(), U256::from(21_000u128 * 20_000_000_000));
    }
}
