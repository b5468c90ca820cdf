//! Task lifecycle helpers.
//!
//! Confirmation waits can end three ways: the receipt arrives, the
//! deadline passes, or the caller cancels through [`Cancellation`].
//! Dropping the future also stops the wait.

pub mod cancel;

pub use cancel::Cancellation;
