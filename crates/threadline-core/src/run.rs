//! Run completion polling.
//!
//! A run is created in `queued` and moves through `in_progress` until the
//! remote service settles it. `wait_for_run` reads the status right away,
//! then once per poll interval, until the status leaves the pending set.
//! The whole wait is bounded by a deadline and can be cancelled through a
//! [`CancellationToken`]. Neither path cancels the run on the remote side.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use threadline_types::assistant::Run;
use threadline_types::config::ChatConfig;
use threadline_types::error::{AssistantApiError, ExchangeFailure};

use crate::assistant::client::AssistantClient;

/// Timing of a run wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Minimum delay between two status checks.
    pub interval: Duration,
    /// Upper bound on the whole wait, starting at the first status check.
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            timeout: config.run_timeout(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Wait until `run` reaches a non-pending status and return its final state.
///
/// `on_poll` is called after every status check with the running count of
/// checks, so callers can surface progress.
///
/// # Errors
///
/// - [`ExchangeFailure::Remote`] if a status check fails (no retry)
/// - [`ExchangeFailure::TimedOut`] once `settings.timeout` has elapsed
/// - [`ExchangeFailure::Cancelled`] as soon as `cancel` fires
pub async fn wait_for_run<C, F>(
    client: &C,
    run: &Run,
    settings: &PollSettings,
    cancel: &CancellationToken,
    mut on_poll: F,
) -> Result<Run, ExchangeFailure>
where
    C: AssistantClient,
    F: FnMut(u32) + Send,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExchangeFailure::Cancelled),
        _ = tokio::time::sleep(settings.timeout) => Err(ExchangeFailure::TimedOut {
            waited: settings.timeout,
        }),
        result = poll_until_settled(client, run, settings.interval, &mut on_poll) => {
            result.map_err(ExchangeFailure::from)
        }
    }
}

async fn poll_until_settled<C, F>(
    client: &C,
    run: &Run,
    interval: Duration,
    on_poll: &mut F,
) -> Result<Run, AssistantApiError>
where
    C: AssistantClient,
    F: FnMut(u32) + Send,
{
    let mut polls: u32 = 0;
    loop {
        let current = client.retrieve_run(&run.thread_id, &run.id).await?;
        polls += 1;
        on_poll(polls);

        if !current.status.is_pending() {
            debug!(run_id = %run.id, status = %current.status, polls, "run settled");
            return Ok(current);
        }

        debug!(run_id = %run.id, status = %current.status, polls, "waiting...");
        tokio::time::sleep(interval).await;
    }
}
