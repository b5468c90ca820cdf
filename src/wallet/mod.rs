//! Wallet key lifecycle.
//!
//! # Data Flow
//! ```text
//! OS entropy ──▶ mnemonic.rs (entropy → phrase → m/44'/60'/0'/0/0)
//! phrase     ──▶ mnemonic.rs (validate, derive)        ──▶ factory.rs ──▶ KeyMaterial
//! hex key    ──▶ keys.rs (format + scalar validation)
//!
//! KeyMaterial ⇄ store.rs (WalletRecord JSON ⇄ injected WalletStore)
//! ```
//!
//! # Security Constraints
//! - Private keys and phrases are never logged, never in error text
//! - Secret buffers are zeroized on drop
//! - Stored records are re-validated against the key on load

pub mod factory;
pub mod keys;
pub mod mnemonic;
pub mod store;

pub use factory::WalletFactory;
pub use keys::{KeyMaterial, PrivateKey, RecoveryPhrase};
pub use mnemonic::WordCount;
pub use store::{FileStore, MemoryStore, WalletRecord, WalletStore};
