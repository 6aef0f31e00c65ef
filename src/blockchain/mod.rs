//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! NetworkProfile (endpoint, chain id)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → rpc.rs (NetworkRpc contract consumed by the sweep)
//!     → wallet.rs + transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Unreachable networks degrade to recorded errors, never panics

pub mod client;
pub mod rpc;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{AlloyConnector, BlockchainClient};
pub use rpc::{NetworkConnector, NetworkRpc};
pub use transaction::ConfirmationWaiter;
pub use types::{
    BlockchainError, BlockchainResult, ConfirmationStatus, ErrorKind, FeeParameters, ReceiptSummary,
    TransferRequest,
};
pub use wallet::Wallet;
