//! Key material: secret scalar, derived address and optional recovery phrase.
//!
//! # Security
//! - The secret scalar lives inside an alloy `PrivateKeySigner`, whose
//!   signing key is wiped on drop.
//! - Recovery phrases are zeroized on drop.
//! - `Debug` output of every type here redacts secrets, so a stray
//!   `tracing::debug!(?key)` cannot leak them.

use std::fmt;

use alloy::primitives::{hex, Address, B256};
use alloy::signers::local::PrivateKeySigner;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{VaultError, VaultResult};

/// Length of a secp256k1 secret scalar in bytes.
pub const PRIVATE_KEY_LEN: usize = 32;

/// A validated secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    signer: PrivateKeySigner,
}

impl PrivateKey {
    /// Create a key from raw bytes.
    ///
    /// Fails with [`VaultError::InvalidPrivateKey`] when the bytes are zero or
    /// not below the curve order.
    pub fn from_bytes(bytes: &[u8; PRIVATE_KEY_LEN]) -> VaultResult<Self> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*bytes)).map_err(|_| {
            VaultError::InvalidPrivateKey("not a valid secp256k1 scalar".into())
        })?;
        Ok(Self { signer })
    }

    /// Parse a hex-encoded key, with or without a `0x` prefix.
    ///
    /// The error text describes what is wrong with the input but never
    /// repeats it.
    pub fn from_hex(input: &str) -> VaultResult<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != PRIVATE_KEY_LEN * 2 {
            return Err(VaultError::InvalidPrivateKey(format!(
                "expected {} hex digits, got {}",
                PRIVATE_KEY_LEN * 2,
                digits.len()
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VaultError::InvalidPrivateKey(
                "contains non-hexadecimal characters".into(),
            ));
        }

        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        hex::decode_to_slice(digits, &mut bytes[..])
            .map_err(|_| VaultError::InvalidPrivateKey("malformed hex".into()))?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Address controlled by this key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Local signer for transaction signing.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// `0x`-prefixed lowercase hex. Handle with care.
    pub fn to_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signer.to_bytes().0);
        Zeroizing::new(format!("0x{}", hex::encode(&bytes[..])))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        let a = Zeroizing::new(self.signer.to_bytes().0);
        let b = Zeroizing::new(other.signer.to_bytes().0);
        *a == *b
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A validated, normalized BIP-39 recovery phrase.
///
/// Only the mnemonic codec constructs these, after validation.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase(String);

impl RecoveryPhrase {
    pub(crate) fn new(normalized: String) -> Self {
        Self(normalized)
    }

    /// Space-separated phrase. Handle with care.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Words in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.words().count()
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPhrase")
            .field("words", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

/// Private key, derived address and (optionally) the phrase it came from.
///
/// Immutable once built. The address is always computed from the key; no
/// constructor accepts one.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    address: Address,
    private_key: PrivateKey,
    recovery_phrase: Option<RecoveryPhrase>,
}

impl KeyMaterial {
    pub(crate) fn new(private_key: PrivateKey, recovery_phrase: Option<RecoveryPhrase>) -> Self {
        Self {
            address: private_key.address(),
            private_key,
            recovery_phrase,
        }
    }

    /// Account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address string.
    pub fn address_checksummed(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Phrase, when the key was generated or imported from one.
    pub fn recovery_phrase(&self) -> Option<&RecoveryPhrase> {
        self.recovery_phrase.as_ref()
    }

    pub fn has_recovery_phrase(&self) -> bool {
        self.recovery_phrase.is_some()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address_checksummed())
            .field("private_key", &"[REDACTED]")
            .field("has_recovery_phrase", &self.has_recovery_phrase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_key_from_hex() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            key.address().to_checksum(None),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_key_with_0x_prefix_and_whitespace() {
        let plain = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let prefixed = PrivateKey::from_hex(&format!("  0x{TEST_PRIVATE_KEY}\n")).unwrap();
        assert_eq!(plain, prefixed);
    }

    #[test]
    fn test_hex_roundtrip_is_lowercase_prefixed() {
        let upper = TEST_PRIVATE_KEY.to_uppercase();
        let key = PrivateKey::from_hex(&upper).unwrap();
        assert_eq!(key.to_hex().as_str(), format!("0x{TEST_PRIVATE_KEY}"));
    }

    #[test]
    fn test_rejects_not_hex() {
        let err = PrivateKey::from_hex("not-hex").unwrap_err();
        assert!(matches!(err, VaultError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_rejects_31_bytes() {
        let short = format!("0x{}", "11".repeat(31));
        let err = PrivateKey::from_hex(&short).unwrap_err();
        assert!(matches!(err, VaultError::InvalidPrivateKey(msg) if msg.contains("62")));
    }

    #[test]
    fn test_rejects_non_hex_of_right_length() {
        let bad = "zz".repeat(32);
        assert!(PrivateKey::from_hex(&bad).is_err());
    }

    #[test]
    fn test_rejects_zero_scalar() {
        let err = PrivateKey::from_bytes(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, VaultError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_rejects_scalar_above_curve_order() {
        assert!(PrivateKey::from_bytes(&[0xFF; 32]).is_err());
    }

    #[test]
    fn test_error_never_echoes_input() {
        let secretish = format!("{}zz", &TEST_PRIVATE_KEY[..62]);
        let err = PrivateKey::from_hex(&secretish).unwrap_err();
        assert!(!err.to_string().contains(&TEST_PRIVATE_KEY[..16]));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let material = KeyMaterial::new(key, None);
        let rendered = format!("{material:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains(&TEST_PRIVATE_KEY[..16]));
        assert!(rendered.contains("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
    }

    #[test]
    fn test_phrase_debug_is_redacted() {
        let phrase = RecoveryPhrase::new("test ".repeat(11) + "junk");
        let rendered = format!("{phrase:?}");
        assert!(!rendered.contains("junk"));
        assert!(rendered.contains("12"));
    }

    #[test]
    fn test_equal_keys_equal_addresses() {
        let a = KeyMaterial::new(PrivateKey::from_hex(TEST_PRIVATE_KEY).unwrap(), None);
        let b = KeyMaterial::new(
            PrivateKey::from_hex(&format!("0x{TEST_PRIVATE_KEY}")).unwrap(),
            None,
        );
        assert_eq!(a.address(), b.address());
        assert_eq!(a, b);
    }
}
