//! Controlled accounts to sweep.
//!
//! # Data Flow
//! ```text
//! key-generation output (wallets/evm-wallets-*.json) or PRIVATE_KEY* env vars
//!     → loader.rs (read, dedupe)
//!     → Vec<Account> (immutable, shared by every network)
//! ```
//!
//! # Security Constraints
//! - Signing keys are held in `SecretString` and never logged or serialized
//! - Key format is not validated here; signing failures surface per outcome

pub mod loader;

use alloy::primitives::Address;
use secrecy::SecretString;
use thiserror::Error;

pub use loader::{env_key_report, AccountLoader, EnvKeyStatus};

/// An address and the key that controls it.
pub struct Account {
    /// Identifier from the key-generation output.
    pub id: u32,
    /// Public address.
    pub address: Address,
    signing_key: SecretString,
}

impl Account {
    pub fn new(id: u32, address: Address, signing_key: impl Into<String>) -> Self {
        Self {
            id,
            address,
            signing_key: SecretString::new(signing_key.into()),
        }
    }

    /// The private key authorizing transfers from `address`.
    pub fn signing_key(&self) -> &SecretString {
        &self.signing_key
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// Errors raised while loading the account set.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The key-generation collaborator has not produced any accounts yet.
    #[error("No accounts found: {0}")]
    NoAccountsFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
