//! Sweep orchestration.
//!
//! # Data Flow
//! ```text
//! networks (registry order) ──buffer_unordered(max_concurrent_networks)──┐
//!     connect + head check, transient failures retried                   │
//!     accounts ──buffered(max_concurrent_accounts)──▶ SweepExecutor      │
//!         outcome ──▶ ReportAggregator (streamed) ──▶ checkpoint         │
//!     network finished ──▶ checkpoint                                    │
//! all networks done ──▶ finalize + persist ◀─────────────────────────────┘
//! ```
//!
//! Faults are contained at the narrowest scope: an account error never stops
//! its network, a connection failure never stops the run.

use alloy::primitives::Address;
use futures_util::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::accounts::Account;
use crate::blockchain::rpc::{NetworkConnector, NetworkRpc};
use crate::blockchain::transaction::ConfirmationWaiter;
use crate::blockchain::types::BlockchainError;
use crate::config::SweepConfig;
use crate::lifecycle::Shutdown;
use crate::registry::NetworkProfile;
use crate::report::aggregator::ReportAggregator;
use crate::report::store::{ReportError, ReportStore};
use crate::report::types::SweepReport;
use crate::resilience::{retry_transient, RetryPolicy};
use crate::sweep::executor::SweepExecutor;
use crate::sweep::fees::FeeEstimator;

/// Run-scope failures. Anything narrower ends up in the report instead.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("no accounts to sweep")]
    NoAccounts,

    #[error("no networks configured")]
    NoNetworks,

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// A finished run and where its report was written.
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub report: SweepReport,
    pub path: PathBuf,
}

/// Drives a sweep across every network.
pub struct SweepEngine {
    connector: Arc<dyn NetworkConnector>,
    settings: SweepConfig,
    destination: Address,
    shutdown: Shutdown,
}

impl SweepEngine {
    pub fn new(
        connector: Arc<dyn NetworkConnector>,
        settings: SweepConfig,
        destination: Address,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            connector,
            settings,
            destination,
            shutdown,
        }
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    /// Sweep `accounts` on every network in `networks`.
    ///
    /// Fails only on a broken precondition or when the final report cannot
    /// be written; every other fault is recorded in the report.
    pub async fn run(
        &self,
        networks: &[NetworkProfile],
        accounts: &[Account],
        store: ReportStore,
    ) -> Result<SweepRun, SweepError> {
        if accounts.is_empty() {
            return Err(SweepError::NoAccounts);
        }
        if networks.is_empty() {
            return Err(SweepError::NoNetworks);
        }
        store.verify_writable()?;

        let aggregator = ReportAggregator::new(self.destination, networks, accounts.len(), store);
        tracing::info!(
            run_id = %aggregator.run_id(),
            destination = %self.destination,
            networks = networks.len(),
            accounts = accounts.len(),
            report = %aggregator.store().path().display(),
            "Sweep starting"
        );

        stream::iter(networks.iter().enumerate())
            .map(|(idx, profile)| self.sweep_network(idx, profile, accounts, &aggregator))
            .buffer_unordered(self.settings.max_concurrent_networks.max(1))
            .collect::<Vec<()>>()
            .await;

        if self.shutdown.is_triggered() {
            tracing::warn!("Sweep cancelled; unstarted networks recorded as cancelled");
        }

        let (report, path) = aggregator.finalize()?;
        tracing::info!(
            run_id = %report.run_id,
            successful_transfers = report.successful_transfers(),
            "Sweep finished"
        );
        Ok(SweepRun { report, path })
    }

    async fn sweep_network(&self, idx: usize, profile: &NetworkProfile, accounts: &[Account], aggregator: &ReportAggregator) {
        if self.shutdown.is_triggered() {
            return;
        }
        aggregator.begin_network(idx);
        tracing::info!(network = %profile.name, chain_id = profile.chain_id, "Sweeping network");

        let rpc = match self.connect(idx, profile, aggregator).await {
            Some(rpc) => rpc,
            None => {
                aggregator.finish_network(idx, false);
                return;
            }
        };

        let executor = SweepExecutor::new(
            rpc,
            profile.clone(),
            self.destination,
            FeeEstimator::from_config(&self.settings),
            ConfirmationWaiter::new(
                self.settings.confirmation_blocks,
                Duration::from_millis(self.settings.receipt_poll_interval_ms),
                Duration::from_secs(self.settings.confirmation_timeout_secs),
            ),
        );

        let executor = &executor;
        let shutdown = &self.shutdown;
        let mut outcomes = stream::iter(accounts)
            .map(|account| async move {
                if shutdown.is_triggered() {
                    None
                } else {
                    Some(executor.process(account).await)
                }
            })
            .buffered(self.settings.max_concurrent_accounts.max(1));

        let mut skipped = 0usize;
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Some(outcome) => aggregator.record_outcome(idx, outcome),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::warn!(network = %profile.name, skipped, "Accounts skipped after cancellation");
        }
        aggregator.finish_network(idx, skipped > 0);
    }

    /// Open the network and read its head, retrying transient failures.
    async fn connect(
        &self,
        idx: usize,
        profile: &NetworkProfile,
        aggregator: &ReportAggregator,
    ) -> Option<Arc<dyn NetworkRpc>> {
        let connector = self.connector.as_ref();
        let outcome = retry_transient(
            RetryPolicy::for_connect(&self.settings),
            &self.shutdown,
            &profile.name,
            move || async move {
                let rpc = connector.connect(profile).await?;
                rpc.get_block_number().await?;
                Ok::<_, BlockchainError>(rpc)
            },
        )
        .await;

        for failure in outcome.failed_attempts {
            aggregator.record_scan_error(idx, format!("connect {}", failure));
        }

        match outcome.result {
            Ok(rpc) => Some(rpc),
            Err(e) => {
                tracing::error!(network = %profile.name, error = %e, kind = e.kind().as_str(), "Network unreachable");
                aggregator.connection_failed(idx, &e);
                None
            }
        }
    }
}
