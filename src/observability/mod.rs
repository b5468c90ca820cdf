//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! wallet, blockchain, transaction subsystems produce:
//!     → tracing events (structured fields, no secrets)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, text or JSON)
//!     → any `metrics` recorder the host installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
