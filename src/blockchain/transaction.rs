//! Transaction building and confirmation monitoring.
//!
//! # Responsibilities
//! - Build legacy-priced native transfers with an exact fee budget
//! - Poll receipts until the transfer is confirmed or reverted
//! - Bound every confirmation wait with a timeout

use alloy::network::TransactionBuilder;
use alloy::primitives::TxHash;
use alloy::rpc::types::TransactionRequest;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::blockchain::rpc::NetworkRpc;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus, TransferRequest};
use crate::blockchain::wallet::Wallet;

/// Build the request for a native-currency transfer.
///
/// `gas_price * gas_limit` is the full fee budget, so the sender keeps nothing
/// beyond what the network consumes.
pub fn build_transfer(wallet: &Wallet, nonce: u64, request: &TransferRequest) -> TransactionRequest {
    TransactionRequest::default()
        .with_to(request.to)
        .with_value(request.value)
        .with_nonce(nonce)
        .with_gas_price(request.gas_price)
        .with_gas_limit(request.gas_limit)
        .with_chain_id(wallet.chain_id())
}

/// Waits for transfers to reach the required depth.
#[derive(Debug, Clone)]
pub struct ConfirmationWaiter {
    required_confirmations: u32,
    poll_interval: Duration,
    timeout: Duration,
}

impl ConfirmationWaiter {
    pub fn new(required_confirmations: u32, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            required_confirmations,
            poll_interval,
            timeout,
        }
    }

    /// Wait for a transaction to be confirmed.
    ///
    /// Transient RPC errors while polling are logged and polled again; the
    /// overall timeout is what turns a stalled network into an error.
    pub async fn wait(&self, rpc: &dyn NetworkRpc, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let result = timeout(self.timeout, async {
            let mut ticker = interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let receipt = match rpc.get_transaction_receipt(tx_hash).await {
                    Ok(Some(r)) => r,
                    Ok(None) => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                    Err(e) if e.kind().is_transient() => {
                        tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed, retrying");
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                if !receipt.success {
                    return Ok(ConfirmationStatus::Failed {
                        reason: "Transaction reverted".to_string(),
                        block_number: receipt.block_number,
                        gas_used: receipt.gas_used,
                    });
                }

                let current_block = match rpc.get_block_number().await {
                    Ok(n) => n,
                    Err(e) if e.kind().is_transient() => continue,
                    Err(e) => return Err(e),
                };
                let tx_block = receipt.block_number.unwrap_or(current_block);
                let confirmations = current_block.saturating_sub(tx_block);

                if confirmations >= u64::from(self.required_confirmations.saturating_sub(1)) {
                    return Ok(ConfirmationStatus::Confirmed {
                        block_number: tx_block,
                        gas_used: receipt.gas_used,
                    });
                }

                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = confirmations,
                    required = self.required_confirmations,
                    "Waiting for confirmations"
                );
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(BlockchainError::ConfirmationTimeout(self.timeout.as_secs())),
        }
    }
}
