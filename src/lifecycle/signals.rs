//! OS signal handling.
//!
//! The first Ctrl-C asks the sweep to stop starting new work; transfers
//! already broadcast are still confirmed. A second Ctrl-C exits at once.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the task translating Ctrl-C into `shutdown`.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Unable to listen for Ctrl-C; cancellation disabled");
            return;
        }
        tracing::warn!("Interrupt received, finishing in-flight transfers");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt received, exiting immediately");
            std::process::exit(130);
        }
    })
}
