//! Retry logic for transient blockchain failures.
//!
//! Only errors whose [`ErrorKind`](crate::blockchain::ErrorKind) is transient
//! are retried. Every failed attempt is kept so the caller can put recovered
//! faults on the record instead of losing them.

use std::future::Future;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::lifecycle::Shutdown;
use crate::resilience::backoff::RetryPolicy;

/// Final result plus every failure seen along the way.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: BlockchainResult<T>,
    /// Failures of attempts that were followed by another attempt.
    pub failed_attempts: Vec<String>,
}

/// Run `op` until it succeeds, fails permanently, or the budget runs out.
///
/// A triggered `shutdown` stops further attempts; the last error is returned.
pub async fn retry_transient<T, F, Fut>(
    policy: RetryPolicy,
    shutdown: &Shutdown,
    label: &str,
    mut op: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BlockchainResult<T>>,
{
    let mut failed_attempts = Vec::new();
    let mut attempt = 1;

    loop {
        let err: BlockchainError = match op().await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    failed_attempts,
                }
            }
            Err(e) => e,
        };

        let exhausted = attempt >= policy.max_attempts;
        if !err.kind().is_transient() || exhausted || shutdown.is_triggered() {
            return RetryOutcome {
                result: Err(err),
                failed_attempts,
            };
        }

        let delay = policy.delay(attempt);
        tracing::warn!(
            operation = label,
            attempt = attempt,
            max_attempts = policy.max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient failure, retrying"
        );
        failed_attempts.push(format!("attempt {}: {}", attempt, err));

        let mut rx = shutdown.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = rx.recv() => {}
        }
        attempt += 1;
    }
}
