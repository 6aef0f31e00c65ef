//! Sweep report data model.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::Account;
use crate::blockchain::types::{BlockchainError, ErrorKind};
use crate::registry::NetworkProfile;

/// Closed set of per-account results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Zero balance; nothing to do.
    Empty,
    /// Balance does not exceed the fee cost; nothing submitted.
    InsufficientForGas,
    /// Transfer confirmed.
    Success,
    /// Transfer mined but reverted.
    Failed,
    /// A query, submission, or confirmation wait faulted.
    Error,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Empty => "empty",
            OutcomeStatus::InsufficientForGas => "insufficient_for_gas",
            OutcomeStatus::Success => "success",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Error => "error",
        }
    }
}

/// The result of evaluating one account on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub wallet_id: u32,
    pub address: Address,
    /// Observed balance; absent when the balance query failed.
    #[serde(default, with = "opt_wei")]
    pub balance: Option<U256>,
    /// Fee budget of the transfer; absent when not computed.
    #[serde(default, with = "opt_wei")]
    pub fee_cost: Option<U256>,
    /// Value submitted for transfer; zero when nothing was submitted.
    #[serde(with = "wei")]
    pub amount: U256,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub gas_used: Option<u64>,
    pub status: OutcomeStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_kind: Option<ErrorKind>,
}

impl TransferOutcome {
    /// Start an outcome for `account`; status is decided by the caller.
    pub fn pending(account: &Account) -> Self {
        Self {
            wallet_id: account.id,
            address: account.address,
            balance: None,
            fee_cost: None,
            amount: U256::ZERO,
            tx_hash: None,
            explorer_url: None,
            block_number: None,
            gas_used: None,
            status: OutcomeStatus::Error,
            error: None,
            error_kind: None,
        }
    }

    pub fn with_status(mut self, status: OutcomeStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as `error`, keeping the message and its classification.
    pub fn errored(mut self, err: &BlockchainError) -> Self {
        self.status = OutcomeStatus::Error;
        self.error = Some(err.to_string());
        self.error_kind = Some(err.kind());
        self
    }
}

/// How a network's sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    /// Accounts are still being processed (only seen in checkpoints).
    InProgress,
    Completed,
    ConnectionFailed,
    Cancelled,
}

impl NetworkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkStatus::InProgress => "in_progress",
            NetworkStatus::Completed => "completed",
            NetworkStatus::ConnectionFailed => "connection_failed",
            NetworkStatus::Cancelled => "cancelled",
        }
    }
}

/// Everything recorded for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkResult {
    pub network_name: String,
    pub chain_id: u64,
    pub currency: String,
    pub status: NetworkStatus,
    pub wallets_with_balance: usize,
    #[serde(with = "wei")]
    pub total_swept: U256,
    /// `total_swept` in whole native-currency units.
    pub total_swept_formatted: String,
    pub outcomes: Vec<TransferOutcome>,
    /// Faults not tied to a single account.
    #[serde(default)]
    pub scan_errors: Vec<String>,
    #[serde(default)]
    pub connection_error: Option<String>,
}

impl NetworkResult {
    pub fn new(profile: &NetworkProfile) -> Self {
        Self {
            network_name: profile.name.clone(),
            chain_id: profile.chain_id,
            currency: profile.currency.clone(),
            status: NetworkStatus::InProgress,
            wallets_with_balance: 0,
            total_swept: U256::ZERO,
            total_swept_formatted: format_ether(U256::ZERO),
            outcomes: Vec::new(),
            scan_errors: Vec::new(),
            connection_error: None,
        }
    }

    /// Result for a network whose endpoint could not be used.
    pub fn connection_failed(profile: &NetworkProfile, err: &BlockchainError) -> Self {
        let mut result = Self::new(profile);
        result.status = NetworkStatus::ConnectionFailed;
        result.connection_error = Some(err.to_string());
        result
    }

    /// Result for a network never started because the run was cancelled.
    pub fn cancelled(profile: &NetworkProfile) -> Self {
        let mut result = Self::new(profile);
        result.status = NetworkStatus::Cancelled;
        result
    }

    /// Append an outcome and update the running totals.
    pub fn push_outcome(&mut self, outcome: TransferOutcome) {
        if outcome.balance.is_some_and(|b| !b.is_zero()) {
            self.wallets_with_balance += 1;
        }
        if outcome.status == OutcomeStatus::Success {
            self.total_swept += outcome.amount;
            self.total_swept_formatted = format_ether(self.total_swept);
        }
        self.outcomes.push(outcome);
    }

    /// Sum of amounts over successful outcomes.
    pub fn recomputed_total(&self) -> U256 {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Success)
            .fold(U256::ZERO, |acc, o| acc + o.amount)
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// The audit record of one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub destination: Address,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub total_accounts: usize,
    pub total_networks: usize,
    pub network_results: Vec<NetworkResult>,
}

impl SweepReport {
    /// Confirmed transfers across every network.
    pub fn successful_transfers(&self) -> usize {
        self.network_results
            .iter()
            .map(|n| n.count(OutcomeStatus::Success))
            .sum()
    }

    pub fn network(&self, name: &str) -> Option<&NetworkResult> {
        self.network_results.iter().find(|n| n.network_name == name)
    }
}

/// Decimal-string serde for wei amounts.
pub(crate) mod wei {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<U256>().map_err(serde::de::Error::custom)
    }
}

pub(crate) mod opt_wei {
    use alloy::primitives::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| raw.parse::<U256>())
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
