//! The remote-procedure contract every network collaborator fulfils.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::accounts::Account;
use crate::blockchain::types::{BlockchainResult, FeeParameters, ReceiptSummary, TransferRequest};
use crate::registry::NetworkProfile;

/// Operations the sweep needs from one network.
#[async_trait]
pub trait NetworkRpc: Send + Sync {
    /// Latest block height.
    async fn get_block_number(&self) -> BlockchainResult<u64>;

    /// Native-currency balance of `address`, in wei.
    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Current fee-market data.
    async fn get_fee_parameters(&self) -> BlockchainResult<FeeParameters>;

    /// Sign `request` with `from`'s key and broadcast it.
    async fn submit_transfer(&self, from: &Account, request: &TransferRequest) -> BlockchainResult<TxHash>;

    /// Receipt for `tx_hash`, or `None` while it is pending.
    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>>;
}

/// Opens a [`NetworkRpc`] for a profile.
///
/// A connector owns nothing shared between networks; every call yields a
/// client used only by that network's sweep.
#[async_trait]
pub trait NetworkConnector: Send + Sync {
    async fn connect(&self, profile: &NetworkProfile) -> BlockchainResult<Arc<dyn NetworkRpc>>;
}
