//! BIP-39 recovery phrases and phrase → key derivation.
//!
//! Phrases are checked against the English wordlist and checksum with
//! [`bip39`]; keys are derived the way every EVM wallet does it (BIP-39 seed
//! with an empty passphrase, BIP-32 path `m/44'/60'/0'/0/0`) through alloy's
//! mnemonic signer, so a phrase restores the same account elsewhere.

use alloy::signers::local::{coins_bip39::English, MnemonicBuilder};
use bip39::{Language, Mnemonic};

use crate::error::{VaultError, VaultResult};
use crate::wallet::keys::{PrivateKey, RecoveryPhrase};

/// BIP-44 path of the first Ethereum account.
pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// Supported phrase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordCount {
    #[default]
    Twelve,
    TwentyFour,
}

impl WordCount {
    pub const fn words(self) -> usize {
        match self {
            WordCount::Twelve => 12,
            WordCount::TwentyFour => 24,
        }
    }

    /// Bytes of entropy encoded by a phrase of this length.
    pub const fn entropy_len(self) -> usize {
        match self {
            WordCount::Twelve => 16,
            WordCount::TwentyFour => 32,
        }
    }

    pub const fn from_words(words: usize) -> Option<Self> {
        match words {
            12 => Some(WordCount::Twelve),
            24 => Some(WordCount::TwentyFour),
            _ => None,
        }
    }
}

/// Collapse runs of whitespace to single spaces and lowercase.
pub fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Validate a phrase and return its normalized form.
pub fn parse(phrase: &str) -> VaultResult<RecoveryPhrase> {
    let normalized = normalize(phrase);
    let words = normalized.split_whitespace().count();
    if WordCount::from_words(words).is_none() {
        return Err(VaultError::InvalidMnemonic(format!(
            "expected 12 or 24 words, got {words}"
        )));
    }
    Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| VaultError::InvalidMnemonic(e.to_string()))?;
    Ok(RecoveryPhrase::new(normalized))
}

/// Whether `phrase` would be accepted by [`derive`].
pub fn validate(phrase: &str) -> bool {
    parse(phrase).is_ok()
}

/// Derive the account key for a phrase.
pub fn derive(phrase: &str) -> VaultResult<PrivateKey> {
    derive_key(&parse(phrase)?)
}

/// Derive the account key for an already validated phrase.
pub fn derive_key(phrase: &RecoveryPhrase) -> VaultResult<PrivateKey> {
    let signer = MnemonicBuilder::<English>::default()
        .phrase(phrase.as_str())
        .derivation_path(DERIVATION_PATH)
        .map_err(|e| VaultError::InvalidMnemonic(format!("derivation path: {e}")))?
        .build()
        .map_err(|e| VaultError::InvalidMnemonic(format!("key derivation failed: {e}")))?;
    Ok(PrivateKey::from_signer(signer))
}

/// Encode entropy as a phrase (16 bytes → 12 words, 32 bytes → 24 words).
pub fn phrase_from_entropy(entropy: &[u8]) -> VaultResult<RecoveryPhrase> {
    if entropy.len() != WordCount::Twelve.entropy_len()
        && entropy.len() != WordCount::TwentyFour.entropy_len()
    {
        return Err(VaultError::InvalidMnemonic(format!(
            "unsupported entropy length {}",
            entropy.len()
        )));
    }
    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| VaultError::InvalidMnemonic(e.to_string()))?;
    Ok(RecoveryPhrase::new(mnemonic.to_string()))
}
