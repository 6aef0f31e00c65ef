//! The multi-network sweep.
//!
//! # Data Flow
//! ```text
//! engine.rs   (networks × accounts, bounded pools, cancellation)
//!     → scanner.rs  (balance of one account)
//!     → fees.rs     (cost of one transfer)
//!     → executor.rs (decide, submit, confirm → TransferOutcome)
//! ```

pub mod engine;
pub mod executor;
pub mod fees;
pub mod scanner;

pub use engine::{SweepEngine, SweepError, SweepRun};
pub use executor::{decide, SweepDecision, SweepExecutor};
pub use fees::{FeeEstimator, FeeQuote};
pub use scanner::{survey_balances, AccountBalance, BalanceScanner, NetworkBalances};
