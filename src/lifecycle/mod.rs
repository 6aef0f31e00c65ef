//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl-C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Engine stops starting accounts and networks
//!     → in-flight confirmation waits run to completion or timeout
//!     → report finalized with cancelled networks marked
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
