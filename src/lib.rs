//! Multi-network EVM balance sweeper.
//!
//! Visits every configured network, moves each account's spendable native
//! balance to one destination, and records every outcome in an audit report.

// Core subsystems
pub mod accounts;
pub mod blockchain;
pub mod config;
pub mod registry;
pub mod report;
pub mod sweep;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use accounts::{Account, AccountLoader};
pub use config::SweeperConfig;
pub use lifecycle::Shutdown;
pub use registry::NetworkProfile;
pub use report::{ReportStore, SweepReport};
pub use sweep::{SweepEngine, SweepError, SweepRun};
