//! Streaming aggregation of sweep outcomes.
//!
//! Outcomes are folded into their network's result the moment they are
//! produced, and the report is checkpointed after every outcome and again when
//! each network closes, so the file on disk reflects real progress even if the
//! process dies mid-run.

use alloy::primitives::Address;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::blockchain::types::BlockchainError;
use crate::observability::metrics;
use crate::registry::NetworkProfile;
use crate::report::store::{ReportError, ReportStore};
use crate::report::types::{NetworkResult, NetworkStatus, SweepReport, TransferOutcome};

struct State {
    report: SweepReport,
    /// One slot per registry entry, filled when that network starts.
    slots: Vec<Option<NetworkResult>>,
}

/// Collects outcomes into a [`SweepReport`] and persists it.
pub struct ReportAggregator {
    profiles: Vec<NetworkProfile>,
    store: ReportStore,
    state: Mutex<State>,
}

impl ReportAggregator {
    pub fn new(destination: Address, profiles: &[NetworkProfile], total_accounts: usize, store: ReportStore) -> Self {
        let report = SweepReport {
            run_id: Uuid::new_v4(),
            destination,
            started_at: Utc::now(),
            finished_at: None,
            total_accounts,
            total_networks: profiles.len(),
            network_results: Vec::new(),
        };
        Self {
            profiles: profiles.to_vec(),
            store,
            state: Mutex::new(State {
                report,
                slots: vec![None; profiles.len()],
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave a slot half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn run_id(&self) -> Uuid {
        self.lock().report.run_id
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Open the result for network `idx`.
    pub fn begin_network(&self, idx: usize) {
        let mut state = self.lock();
        state.slots[idx] = Some(NetworkResult::new(&self.profiles[idx]));
    }

    /// Record a network whose endpoint could not be used. Follow with
    /// [`finish_network`](Self::finish_network).
    pub fn connection_failed(&self, idx: usize, err: &BlockchainError) {
        let mut state = self.lock();
        let mut result = NetworkResult::connection_failed(&self.profiles[idx], err);
        if let Some(previous) = state.slots[idx].take() {
            result.scan_errors = previous.scan_errors;
        }
        state.slots[idx] = Some(result);
    }

    /// Append one account's outcome to network `idx` and checkpoint the report.
    pub fn record_outcome(&self, idx: usize, outcome: TransferOutcome) {
        let profile = &self.profiles[idx];
        metrics::record_outcome(&profile.name, outcome.status);
        let mut state = self.lock();
        let result = state.slots[idx].get_or_insert_with(|| NetworkResult::new(profile));
        result.push_outcome(outcome);
        // Written under the lock so a newer snapshot is never overtaken by an older one.
        self.store.checkpoint(&build_report(&state, &self.profiles, false));
    }

    /// Record a fault of network `idx` not tied to any account.
    pub fn record_scan_error(&self, idx: usize, message: impl Into<String>) {
        let profile = &self.profiles[idx];
        let mut state = self.lock();
        let result = state.slots[idx].get_or_insert_with(|| NetworkResult::new(profile));
        result.scan_errors.push(message.into());
    }

    /// Close network `idx` and checkpoint the report.
    pub fn finish_network(&self, idx: usize, cancelled: bool) {
        let mut state = self.lock();
        let profile = &self.profiles[idx];
        let result = state.slots[idx].get_or_insert_with(|| NetworkResult::new(profile));
        if result.status == NetworkStatus::InProgress {
            result.status = if cancelled {
                NetworkStatus::Cancelled
            } else {
                NetworkStatus::Completed
            };
        }
        debug_assert_eq!(result.total_swept, result.recomputed_total());
        metrics::record_network_result(result.status);
        metrics::record_swept(&profile.name, &result.total_swept_formatted);
        tracing::info!(
            network = %profile.name,
            status = result.status.as_str(),
            wallets_with_balance = result.wallets_with_balance,
            total_swept = %result.total_swept_formatted,
            currency = %profile.currency,
            "Network finished"
        );
        self.store.checkpoint(&build_report(&state, &self.profiles, false));
    }

    /// Current report; networks not yet started are omitted.
    pub fn snapshot(&self) -> SweepReport {
        build_report(&self.lock(), &self.profiles, false)
    }

    /// Complete the report and write it.
    ///
    /// Networks that never started are recorded as cancelled, so the report
    /// holds exactly one result per registry entry.
    pub fn finalize(&self) -> Result<(SweepReport, PathBuf), ReportError> {
        let report = {
            let mut state = self.lock();
            state.report.finished_at = Some(Utc::now());
            build_report(&state, &self.profiles, true)
        };
        let path = self.store.persist(&report)?;
        tracing::info!(path = %path.display(), "Sweep report written");
        Ok((report, path))
    }
}

fn build_report(state: &State, profiles: &[NetworkProfile], complete: bool) -> SweepReport {
    let mut report = state.report.clone();
    report.network_results = state
        .slots
        .iter()
        .zip(profiles)
        .filter_map(|(slot, profile)| match slot {
            Some(result) => Some(result.clone()),
            None if complete => Some(NetworkResult::cancelled(profile)),
            None => None,
        })
        .collect();
    report
}
