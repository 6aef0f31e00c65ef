//! Human-readable rendering of a sweep report.

use std::fmt::Write;

use crate::report::types::{NetworkStatus, OutcomeStatus, SweepReport};

/// Multi-line console summary of `report`.
pub fn render_summary(report: &SweepReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sweep {} → {}", report.run_id, report.destination);
    let _ = writeln!(
        out,
        "Started {}{}",
        report.started_at.to_rfc3339(),
        report
            .finished_at
            .map(|t| format!(", finished {}", t.to_rfc3339()))
            .unwrap_or_default()
    );
    let _ = writeln!(
        out,
        "{} accounts across {} networks, {} successful transfers",
        report.total_accounts,
        report.total_networks,
        report.successful_transfers()
    );

    for network in &report.network_results {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} (chain {}): {}", network.network_name, network.chain_id, network.status.as_str());

        if network.status == NetworkStatus::ConnectionFailed {
            let _ = writeln!(
                out,
                "  connection error: {}",
                network.connection_error.as_deref().unwrap_or("unknown")
            );
        }
        let _ = writeln!(
            out,
            "  funded wallets: {}  swept: {} {}",
            network.wallets_with_balance, network.total_swept_formatted, network.currency
        );
        let _ = writeln!(
            out,
            "  empty {}  insufficient {}  success {}  failed {}  error {}",
            network.count(OutcomeStatus::Empty),
            network.count(OutcomeStatus::InsufficientForGas),
            network.count(OutcomeStatus::Success),
            network.count(OutcomeStatus::Failed),
            network.count(OutcomeStatus::Error),
        );

        for outcome in &network.outcomes {
            match outcome.status {
                OutcomeStatus::Success | OutcomeStatus::Failed => {
                    let _ = writeln!(
                        out,
                        "  #{} {} {} {} wei {}",
                        outcome.wallet_id,
                        outcome.address,
                        outcome.status.as_str(),
                        outcome.amount,
                        outcome.explorer_url.as_deref().unwrap_or("")
                    );
                }
                OutcomeStatus::Error => {
                    let _ = writeln!(
                        out,
                        "  #{} {} error: {}",
                        outcome.wallet_id,
                        outcome.address,
                        outcome.error.as_deref().unwrap_or("unknown")
                    );
                }
                OutcomeStatus::Empty | OutcomeStatus::InsufficientForGas => {}
            }
        }
        for scan_error in &network.scan_errors {
            let _ = writeln!(out, "  scan: {}", scan_error);
        }
    }
    out
}
