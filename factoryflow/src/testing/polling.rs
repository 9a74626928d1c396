//! Caller-side run polling.

use std::time::Duration;
use tracing::debug;

use crate::core::RunResponse;
use crate::orchestrator::RunOrchestrator;

/// Polls a run until it reaches a terminal status or `max_attempts` polls
/// have been made, and returns the last response.
///
/// `max_attempts` is at least one.
pub async fn wait_for_terminal(
    runs: &RunOrchestrator,
    pipeline_name: &str,
    run_id: &str,
    delay: Duration,
    max_attempts: usize,
) -> RunResponse {
    let mut attempt = 1;
    loop {
        let response = runs.poll(pipeline_name, run_id).await;
        let status = response.run_status();
        debug!(attempt, %status, "wait_for_terminal: polled");
        if status.is_terminal() || attempt >= max_attempts {
            return response;
        }
        attempt += 1;
        tokio::time::sleep(delay).await;
    }
}
