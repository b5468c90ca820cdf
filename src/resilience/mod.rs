//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Idempotent read (balance, nonce, gas price, receipt):
//!     → ChainClient call (per-call timeout inside the client)
//!     → On transient failure: retries.rs (bounded attempts)
//!     → backoff.rs (exponential delay + jitter between attempts)
//!
//! Submission:
//!     → single attempt, no retry layer
//! ```

pub mod backoff;
pub mod retries;

pub use retries::{retry_read, RetryPolicy};
