//! Chain-specific types and error definitions.

use alloy::primitives::Address;
use alloy::transports::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// The endpoint could not be reached or the connection dropped.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction not confirmed within {0} seconds")]
    ConfirmationTimeout(u64),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Endpoint URL could not be resolved or parsed.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Response could not be interpreted.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Structured classification of a [`BlockchainError`], recorded in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Timeout,
    Rpc,
    Nonce,
    InsufficientFunds,
    Underpriced,
    Signing,
    ChainMismatch,
    InvalidEndpoint,
    Reverted,
    Other,
}

impl ErrorKind {
    /// Whether a fresh attempt against the same endpoint could succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Transport | ErrorKind::Timeout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Rpc => "rpc",
            ErrorKind::Nonce => "nonce",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::Underpriced => "underpriced",
            ErrorKind::Signing => "signing",
            ErrorKind::ChainMismatch => "chain_mismatch",
            ErrorKind::InvalidEndpoint => "invalid_endpoint",
            ErrorKind::Reverted => "reverted",
            ErrorKind::Other => "other",
        }
    }
}

/// JSON-RPC server error code used by geth-style nodes for rejected transactions.
const TX_REJECTED_CODE: i64 = -32000;
/// EIP-1474 "transaction rejected".
const EIP1474_REJECTED_CODE: i64 = -32003;

impl BlockchainError {
    /// Convert an alloy transport error, keeping the JSON-RPC error payload when present.
    pub fn from_transport(err: TransportError) -> Self {
        if let Some(payload) = err.as_error_resp() {
            return BlockchainError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            };
        }
        if err.is_transport_error() {
            return BlockchainError::Transport(err.to_string());
        }
        BlockchainError::Malformed(err.to_string())
    }

    /// Classify this error.
    ///
    /// Variants map directly; JSON-RPC errors are classified by code first and
    /// only then by the node's message, since nodes disagree on wording.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockchainError::Transport(_) => ErrorKind::Transport,
            BlockchainError::Timeout(_) | BlockchainError::ConfirmationTimeout(_) => ErrorKind::Timeout,
            BlockchainError::Wallet(_) => ErrorKind::Signing,
            BlockchainError::InvalidEndpoint(_) => ErrorKind::InvalidEndpoint,
            BlockchainError::ChainMismatch { .. } => ErrorKind::ChainMismatch,
            BlockchainError::Malformed(_) => ErrorKind::Other,
            BlockchainError::Rpc { code, message } => classify_rpc(*code, message),
        }
    }

    /// Whether the node refused a broadcast because it already holds that
    /// exact transaction.
    pub fn is_already_known(&self) -> bool {
        match self {
            BlockchainError::Rpc { message, .. } => {
                let message = message.to_ascii_lowercase();
                message.contains("already known")
                    || message.contains("known transaction")
                    || message.contains("already imported")
            }
            _ => false,
        }
    }
}

fn classify_rpc(code: i64, message: &str) -> ErrorKind {
    if code != TX_REJECTED_CODE && code != EIP1474_REJECTED_CODE {
        return ErrorKind::Rpc;
    }
    let message = message.to_ascii_lowercase();
    if message.contains("nonce") || message.contains("already known") {
        ErrorKind::Nonce
    } else if message.contains("insufficient funds") {
        ErrorKind::InsufficientFunds
    } else if message.contains("underpriced") || message.contains("fee cap") {
        ErrorKind::Underpriced
    } else {
        ErrorKind::Rpc
    }
}

/// Fee-market data reported by a node. Either field may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeParameters {
    /// Legacy `eth_gasPrice`, in wei.
    pub gas_price: Option<u128>,
    /// EIP-1559 max fee per gas, in wei.
    pub max_fee_per_gas: Option<u128>,
}

/// A native-currency transfer to be signed and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: alloy::primitives::U256,
    pub gas_price: u128,
    pub gas_limit: u64,
}

/// The parts of a transaction receipt the sweep cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    /// `true` when the transaction executed successfully.
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64, gas_used: u64 },
    /// Transaction was mined but reverted.
    Failed { reason: String, block_number: Option<u64>, gas_used: u64 },
}
