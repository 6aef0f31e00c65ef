//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sweep engine and aggregator produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (outcome counters, swept-amount gauges)
//!
//! Consumers:
//!     → Operator console
//!     → Prometheus text snapshot written next to the report
//! ```
//!
//! Private keys never reach either channel.

pub mod logging;
pub mod metrics;
