//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Network connection attempt:
//!     → retries.rs (retry transient failures, collect each failure)
//!     → backoff.rs (exponential delay with jitter between attempts)
//! ```
//!
//! Transfers are never retried here: a resubmitted transfer could move funds
//! twice. Only idempotent connection setup goes through this path.

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, RetryPolicy};
pub use retries::{retry_transient, RetryOutcome};
