//! Sweep metrics.
//!
//! # Metrics
//! - `sweep_outcomes_total` (counter): account outcomes by network, status
//! - `sweep_network_results_total` (counter): finished networks by status
//! - `sweep_swept_native` (gauge): amount swept per network, whole units
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::report::types::{NetworkStatus, OutcomeStatus};

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_outcome(network: &str, status: OutcomeStatus) {
    counter!(
        "sweep_outcomes_total",
        "network" => network.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
}

pub fn record_network_result(status: NetworkStatus) {
    counter!("sweep_network_results_total", "status" => status.as_str()).increment(1);
}

/// Gauge of the swept total; `formatted` is the whole-unit decimal string.
pub fn record_swept(network: &str, formatted: &str) {
    // Precision loss is acceptable for a dashboard value.
    let value = formatted.parse::<f64>().unwrap_or(0.0);
    gauge!("sweep_swept_native", "network" => network.to_string()).set(value);
}
