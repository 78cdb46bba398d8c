//! Retry handling for fallible external calls.
//!
//! Retries draw from the shared per-turn budget in
//! [`WorkflowState::retry_count`], so a turn that burns retries on a tool
//! call has fewer left for a later collaboration call. Only transient
//! failures are retried; fatal errors surface immediately.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::WorkflowConfig;
use crate::error::OrchestratorError;
use crate::workflow::WorkflowState;

/// Delay before retry number `attempt` (1-based): exponential from the
/// configured base, capped, plus up to half the base of random jitter.
pub fn backoff_delay(config: &WorkflowConfig, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let raw = config
        .backoff_base_ms
        .saturating_mul(1u64 << exp)
        .min(config.backoff_cap_ms);
    let jitter = if config.backoff_base_ms > 1 {
        rand::thread_rng().gen_range(0..config.backoff_base_ms / 2)
    } else {
        0
    };
    Duration::from_millis(raw + jitter)
}

/// Run `call` until it succeeds, returns a fatal error, or the turn's retry
/// budget is exhausted. Every failure is recorded in `state.last_error`.
pub async fn with_retry<T, F, Fut>(
    state: &mut WorkflowState,
    config: &WorkflowConfig,
    operation: &str,
    mut call: F,
) -> Result<T, OrchestratorError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OrchestratorError>>,
{
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && state.retry_count < state.max_retries => {
                state.retry_count += 1;
                state.last_error = Some(err.to_string());
                let delay = backoff_delay(config, state.retry_count);
                tracing::warn!(
                    operation,
                    reason = err.reason_code(),
                    retry = state.retry_count,
                    max = state.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                state.last_error = Some(err.to_string());
                tracing::warn!(
                    operation,
                    reason = err.reason_code(),
                    retries_used = state.retry_count,
                    "call failed without remaining retries"
                );
                return Err(err);
            }
        }
    }
}
