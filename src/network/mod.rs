//! Network configuration subsystem.
//!
//! # Data Flow
//! ```text
//! built-in table + [[networks]] from config
//!     → registry.rs (validate ids and chain ids)
//!     → NetworkRegistry (immutable, shared via Arc)
//!     → ClientPool / TransactionEngine resolve by id
//! ```

pub mod registry;

pub use registry::{builtin_networks, NetworkDescriptor, NetworkRegistry, DEFAULT_NETWORK};
