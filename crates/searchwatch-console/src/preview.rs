/*
[INPUT]:  ExecutionSource, task id, PollConfig, CancellationToken
[OUTPUT]: PreviewOutcome covering every way a Run Now can end
[POS]:    Console domain - preview runner over the execution poller
[UPDATE]: When adding outcome kinds or changing cancellation handling
[UPDATE]: 2026-10-16 One interrupt token per run so an earlier Ctrl-C does not abandon later runs
*/

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use searchwatch_adapter::{
    ExecutionPoller, ExecutionSource, PollConfig, SearchwatchError, TaskExecution,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    Completed(TaskExecution),
    /// The execution ran and failed
    Failed { message: String },
    /// Still not terminal after the poll ceiling; the user may retry
    TimedOut,
    /// Triggering or fetching failed before an outcome was known
    RequestFailed { message: String },
    /// Stopped observing on request; the backend run continues
    Abandoned,
}

impl PreviewOutcome {
    pub fn execution(&self) -> Option<&TaskExecution> {
        match self {
            PreviewOutcome::Completed(execution) => Some(execution),
            _ => None,
        }
    }

    fn from_result(result: Result<TaskExecution, SearchwatchError>) -> Self {
        match result {
            Ok(execution) => PreviewOutcome::Completed(execution),
            Err(SearchwatchError::ExecutionFailed { message, .. }) => {
                PreviewOutcome::Failed { message }
            }
            Err(SearchwatchError::ExecutionTimedOut { .. }) => PreviewOutcome::TimedOut,
            Err(err) => PreviewOutcome::RequestFailed {
                message: err.to_string(),
            },
        }
    }
}

/// Token cancelled on the next Ctrl-C. Only stops local observation, so
/// take a new one for every run.
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        child.cancel();
    });
    token
}

/// Run the task once with notifications suppressed and report how it ended.
pub async fn run_preview<S>(
    source: &S,
    task_id: &str,
    config: PollConfig,
    cancel: &CancellationToken,
) -> PreviewOutcome
where
    S: ExecutionSource + ?Sized,
{
    let poller = ExecutionPoller::new(source, config);
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!(task_id, "preview abandoned");
            PreviewOutcome::Abandoned
        }
        result = poller.run_preview(task_id) => PreviewOutcome::from_result(result),
    };

    if let PreviewOutcome::RequestFailed { message } = &outcome {
        warn!(task_id, error = %message, "preview request failed");
    }
    outcome
}
