//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → VaultConfig (validated, immutable)
//!     → client settings, engine settings, network overrides, store path
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ConfirmationConfig, ObservabilityConfig, RpcConfig, StoreConfig, TransactionConfig,
    VaultConfig,
};
pub use validation::{validate_config, validate_config_for, ValidationError};
