//! Sweep reporting subsystem.
//!
//! # Data Flow
//! ```text
//! SweepExecutor outcome
//!     → aggregator.rs (fold into NetworkResult, running totals)
//!     → store.rs (checkpoint per outcome, final atomic write)
//!     → summary.rs (console rendering, also used by `sweep-report`)
//! ```
//!
//! The persisted JSON is the sole audit record of a run. Amounts are exact
//! decimal wei strings.

pub mod aggregator;
pub mod store;
pub mod summary;
pub mod types;

pub use aggregator::ReportAggregator;
pub use store::{latest_report, load_report, ReportError, ReportStore, REPORT_PREFIX};
pub use summary::render_summary;
pub use types::{NetworkResult, NetworkStatus, OutcomeStatus, SweepReport, TransferOutcome};
