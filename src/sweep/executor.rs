//! Per-account sweep decision and execution.
//!
//! # Decision
//! ```text
//! balance == 0          → empty
//! balance <= fee_cost   → insufficient_for_gas (nothing submitted)
//! balance >  fee_cost   → transfer balance - fee_cost, then wait:
//!                           success | failed (reverted) | error
//! ```
//!
//! Every account ends in exactly one [`TransferOutcome`]. Nothing here is
//! retried: a transfer is broadcast at most once per run.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::accounts::Account;
use crate::blockchain::rpc::NetworkRpc;
use crate::blockchain::transaction::ConfirmationWaiter;
use crate::blockchain::types::{ConfirmationStatus, ErrorKind, TransferRequest};
use crate::registry::NetworkProfile;
use crate::report::types::{OutcomeStatus, TransferOutcome};
use crate::sweep::fees::FeeEstimator;
use crate::sweep::scanner::BalanceScanner;

/// What to do with an observed balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDecision {
    Empty,
    InsufficientForGas,
    /// Transfer this amount, leaving exactly the fee behind.
    Transfer(U256),
}

/// Decide from a balance and a fee cost, both in wei.
pub fn decide(balance: U256, fee_cost: U256) -> SweepDecision {
    if balance.is_zero() {
        SweepDecision::Empty
    } else if balance <= fee_cost {
        SweepDecision::InsufficientForGas
    } else {
        SweepDecision::Transfer(balance - fee_cost)
    }
}

/// Sweeps accounts on one network into the destination.
pub struct SweepExecutor {
    rpc: Arc<dyn NetworkRpc>,
    scanner: BalanceScanner,
    fees: FeeEstimator,
    waiter: ConfirmationWaiter,
    profile: NetworkProfile,
    destination: Address,
}

impl SweepExecutor {
    pub fn new(
        rpc: Arc<dyn NetworkRpc>,
        profile: NetworkProfile,
        destination: Address,
        fees: FeeEstimator,
        waiter: ConfirmationWaiter,
    ) -> Self {
        Self {
            scanner: BalanceScanner::new(rpc.clone()),
            rpc,
            fees,
            waiter,
            profile,
            destination,
        }
    }

    /// Evaluate `account` and sweep it if worthwhile.
    pub async fn process(&self, account: &Account) -> TransferOutcome {
        let outcome = self.evaluate(account).await;
        tracing::info!(
            network = %self.profile.name,
            wallet_id = account.id,
            address = %account.address,
            status = outcome.status.as_str(),
            amount = %outcome.amount,
            error = outcome.error.as_deref().unwrap_or(""),
            "Account processed"
        );
        outcome
    }

    async fn evaluate(&self, account: &Account) -> TransferOutcome {
        let mut outcome = TransferOutcome::pending(account);

        let balance = match self.scanner.balance_of(account).await {
            Ok(b) => b,
            Err(e) => return outcome.errored(&e),
        };
        outcome.balance = Some(balance);
        if balance.is_zero() {
            return outcome.with_status(OutcomeStatus::Empty);
        }

        let quote = match self.fees.estimate(self.rpc.as_ref()).await {
            Ok(q) => q,
            Err(e) => return outcome.errored(&e),
        };
        if quote.used_fallback {
            tracing::warn!(
                network = %self.profile.name,
                gas_price = quote.gas_price,
                "No fee data reported, using fallback gas price"
            );
        }
        let fee_cost = quote.cost();
        outcome.fee_cost = Some(fee_cost);

        let amount = match decide(balance, fee_cost) {
            SweepDecision::Empty => return outcome.with_status(OutcomeStatus::Empty),
            SweepDecision::InsufficientForGas => return outcome.with_status(OutcomeStatus::InsufficientForGas),
            SweepDecision::Transfer(amount) => amount,
        };

        let request = TransferRequest {
            to: self.destination,
            value: amount,
            gas_price: quote.gas_price,
            gas_limit: quote.gas_limit,
        };
        let tx_hash = match self.rpc.submit_transfer(account, &request).await {
            Ok(hash) => hash,
            Err(e) => return outcome.errored(&e),
        };
        outcome.amount = amount;
        outcome.tx_hash = Some(tx_hash);
        outcome.explorer_url = Some(self.profile.explorer_link(&tx_hash.to_string()));
        tracing::debug!(network = %self.profile.name, tx_hash = %tx_hash, "Transfer broadcast");

        match self.waiter.wait(self.rpc.as_ref(), tx_hash).await {
            Ok(ConfirmationStatus::Confirmed { block_number, gas_used }) => {
                outcome.block_number = Some(block_number);
                outcome.gas_used = Some(gas_used);
                outcome.with_status(OutcomeStatus::Success)
            }
            Ok(ConfirmationStatus::Failed {
                reason,
                block_number,
                gas_used,
            }) => {
                outcome.block_number = block_number;
                outcome.gas_used = Some(gas_used);
                outcome.error = Some(reason);
                outcome.error_kind = Some(ErrorKind::Reverted);
                outcome.with_status(OutcomeStatus::Failed)
            }
            Err(e) => outcome.errored(&e),
        }
    }
}
