//! Wallet record persistence.
//!
//! The core never picks a storage medium. It serializes one
//! [`WalletRecord`] to an opaque blob and hands it to an injected
//! [`WalletStore`]. Two stores ship with the crate: [`MemoryStore`] for
//! tests and embedding, and [`FileStore`] for a single JSON file.
//!
//! # Record format
//! ```text
//! { "address": "0x…", "recoveryPhrase": "word …" | "", "privateKey": "0x…" }
//! ```
//! `mnemonic` is accepted as an alias of `recoveryPhrase` when reading.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{VaultError, VaultResult};
use crate::wallet::keys::{KeyMaterial, PrivateKey};
use crate::wallet::mnemonic;

/// The single stored wallet record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub address: String,
    #[serde(default, alias = "mnemonic")]
    pub recovery_phrase: String,
    pub private_key: String,
}

impl WalletRecord {
    /// Snapshot key material into its storage shape.
    pub fn from_key_material(material: &KeyMaterial) -> Self {
        Self {
            address: material.address_checksummed(),
            recovery_phrase: material
                .recovery_phrase()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
            private_key: material.private_key().to_hex().to_string(),
        }
    }

    /// Rebuild key material, re-deriving everything from the secret.
    ///
    /// Rejects records whose stored address or phrase disagree with the
    /// private key.
    pub fn to_key_material(&self) -> VaultResult<KeyMaterial> {
        let key = PrivateKey::from_hex(&self.private_key)
            .map_err(|e| VaultError::CorruptedRecord(e.to_string()))?;

        let phrase = if self.recovery_phrase.trim().is_empty() {
            None
        } else {
            let phrase = mnemonic::parse(&self.recovery_phrase)
                .map_err(|e| VaultError::CorruptedRecord(e.to_string()))?;
            if mnemonic::derive_key(&phrase)? != key {
                return Err(VaultError::CorruptedRecord(
                    "recovery phrase does not match private key".into(),
                ));
            }
            Some(phrase)
        };

        let stored: Address = self
            .address
            .trim()
            .parse()
            .map_err(|_| VaultError::CorruptedRecord("unparsable address".into()))?;
        let material = KeyMaterial::new(key, phrase);
        if stored != material.address() {
            return Err(VaultError::CorruptedRecord(
                "address does not match private key".into(),
            ));
        }
        Ok(material)
    }

    /// JSON encoding.
    pub fn to_bytes(&self) -> VaultResult<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| VaultError::Storage(format!("serialize record: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> VaultResult<Self> {
        // serde_json errors quote no input, only positions.
        serde_json::from_slice(bytes)
            .map_err(|e| VaultError::CorruptedRecord(format!("unreadable record: {e}")))
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("address", &self.address)
            .field("recovery_phrase", &"[REDACTED]")
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Capability to persist one opaque record.
pub trait WalletStore: Send + Sync {
    /// Stored blob, or `None` when nothing is stored.
    fn read(&self) -> VaultResult<Option<Zeroizing<Vec<u8>>>>;

    /// Replace the stored blob.
    fn write(&self, blob: &[u8]) -> VaultResult<()>;

    /// Remove the stored blob. Clearing an empty store is not an error.
    fn clear(&self) -> VaultResult<()>;
}

/// Persist `material` to `store`.
pub fn save(store: &dyn WalletStore, material: &KeyMaterial) -> VaultResult<()> {
    let blob = WalletRecord::from_key_material(material).to_bytes()?;
    store.write(&blob)?;
    tracing::info!(address = %material.address(), "Wallet record saved");
    Ok(())
}

/// Load and validate the stored wallet, if any.
pub fn load(store: &dyn WalletStore) -> VaultResult<Option<KeyMaterial>> {
    let Some(blob) = store.read()? else {
        return Ok(None);
    };
    let material = WalletRecord::from_bytes(&blob)?.to_key_material()?;
    tracing::debug!(address = %material.address(), "Wallet record loaded");
    Ok(Some(material))
}

/// In-process store.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Zeroizing<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletStore for MemoryStore {
    fn read(&self) -> VaultResult<Option<Zeroizing<Vec<u8>>>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))?;
        Ok(slot.clone())
    }

    fn write(&self, blob: &[u8]) -> VaultResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))?;
        *slot = Some(Zeroizing::new(blob.to_vec()));
        Ok(())
    }

    fn clear(&self) -> VaultResult<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| VaultError::Storage("memory store lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

/// Single-file store.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a crash mid-write leaves the previous record intact. On Unix the file
/// is created with mode `0600`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "wallet".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, err: io::Error) -> VaultError {
        VaultError::Storage(format!("{action} {}: {err}", self.path.display()))
    }
}

impl WalletStore for FileStore {
    fn read(&self) -> VaultResult<Option<Zeroizing<Vec<u8>>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error("read", e)),
        }
    }

    fn write(&self, blob: &[u8]) -> VaultResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create parent of", e))?;
        }

        let temp = self.temp_path();
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&temp).map_err(|e| self.io_error("open", e))?;
        file.write_all(blob).map_err(|e| self.io_error("write", e))?;
        file.sync_all().map_err(|e| self.io_error("sync", e))?;
        drop(file);

        fs::rename(&temp, &self.path).map_err(|e| self.io_error("replace", e))
    }

    fn clear(&self) -> VaultResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("remove", e)),
        }
    }
}
