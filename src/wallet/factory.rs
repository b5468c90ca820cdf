//! Wallet creation and import.
//!
//! Every constructor here is a pure function of its input plus the OS
//! randomness source; nothing is cached between calls.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::VaultResult;
use crate::observability::metrics;
use crate::wallet::keys::{KeyMaterial, PrivateKey};
use crate::wallet::mnemonic::{self, WordCount};

/// Produces [`KeyMaterial`] from fresh entropy, a phrase or a raw key.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletFactory {
    word_count: WordCount,
}

impl WalletFactory {
    /// Factory generating 12-word phrases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory generating phrases of the given length.
    pub fn with_word_count(word_count: WordCount) -> Self {
        Self { word_count }
    }

    /// Generate a new wallet from OS entropy.
    ///
    /// The returned material always carries its recovery phrase.
    pub fn generate(&self) -> VaultResult<KeyMaterial> {
        let mut entropy = Zeroizing::new(vec![0u8; self.word_count.entropy_len()]);
        OsRng.fill_bytes(&mut entropy[..]);

        let phrase = mnemonic::phrase_from_entropy(&entropy)?;
        let key = mnemonic::derive_key(&phrase)?;
        let material = KeyMaterial::new(key, Some(phrase));

        metrics::record_wallet_created("generated");
        tracing::info!(
            address = %material.address(),
            words = self.word_count.words(),
            "Wallet generated"
        );
        Ok(material)
    }

    /// One-off generation with a specific phrase length.
    pub fn generate_with(word_count: WordCount) -> VaultResult<KeyMaterial> {
        Self::with_word_count(word_count).generate()
    }

    /// Import from a recovery phrase.
    ///
    /// The phrase is trimmed and normalized; the normalized form is what
    /// the returned material keeps.
    pub fn import_from_phrase(&self, phrase: &str) -> VaultResult<KeyMaterial> {
        let phrase = mnemonic::parse(phrase.trim())?;
        let key = mnemonic::derive_key(&phrase)?;
        let material = KeyMaterial::new(key, Some(phrase));

        metrics::record_wallet_created("phrase");
        tracing::info!(address = %material.address(), "Wallet imported from recovery phrase");
        Ok(material)
    }

    /// Import from a hex private key (optionally `0x`-prefixed).
    pub fn import_from_private_key(&self, key: &str) -> VaultResult<KeyMaterial> {
        let key = PrivateKey::from_hex(key)?;
        let material = KeyMaterial::new(key, None);

        metrics::record_wallet_created("private_key");
        tracing::info!(address = %material.address(), "Wallet imported from private key");
        Ok(material)
    }
}
