/*
[INPUT]:  ExecutionSource (HTTP client or test double), task id, PollConfig
[OUTPUT]: Terminal TaskExecution, ExecutionFailed or ExecutionTimedOut
[POS]:    Domain layer - "Run Now" preview polling
[UPDATE]: When changing poll cadence, ceiling or error classification
[UPDATE]: 2026-09-24 Retryable fetch errors consume an attempt instead of aborting
*/

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::http::{Result, SearchwatchClient, SearchwatchError};
use crate::types::{ExecutionStatus, TaskExecution};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

const FALLBACK_FAILURE_MESSAGE: &str = "Execution failed";

/// Cadence and ceiling for a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl PollConfig {
    /// Longest time a poll can observe before giving up.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Where executions are triggered and listed.
#[async_trait]
pub trait ExecutionSource: Send + Sync {
    async fn trigger_execution(
        &self,
        task_id: &str,
        suppress_notifications: bool,
    ) -> Result<TaskExecution>;

    async fn fetch_executions(&self, task_id: &str) -> Result<Vec<TaskExecution>>;
}

#[async_trait]
impl ExecutionSource for SearchwatchClient {
    async fn trigger_execution(
        &self,
        task_id: &str,
        suppress_notifications: bool,
    ) -> Result<TaskExecution> {
        self.execute_task(task_id, suppress_notifications).await
    }

    async fn fetch_executions(&self, task_id: &str) -> Result<Vec<TaskExecution>> {
        self.list_executions(task_id, None).await
    }
}

/// Triggers a suppressed run and watches it until it settles.
///
/// Dropping the returned future stops observing; the backend run continues.
#[derive(Debug)]
pub struct ExecutionPoller<'a, S: ?Sized> {
    source: &'a S,
    config: PollConfig,
}

impl<'a, S> ExecutionPoller<'a, S>
where
    S: ExecutionSource + ?Sized,
{
    pub fn new(source: &'a S, config: PollConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Run the task now with notifications suppressed and wait for the outcome.
    pub async fn run_preview(&self, task_id: &str) -> Result<TaskExecution> {
        let execution = self.source.trigger_execution(task_id, true).await?;
        info!(task_id, execution_id = %execution.id, "preview execution triggered");

        if execution.status.is_terminal() {
            return settle(execution);
        }
        self.wait_for(task_id, &execution.id).await
    }

    /// Poll the task's execution list until `execution_id` is terminal.
    pub async fn wait_for(&self, task_id: &str, execution_id: &str) -> Result<TaskExecution> {
        for attempt in 1..=self.config.max_attempts {
            tokio::time::sleep(self.config.interval).await;

            let executions = match self.source.fetch_executions(task_id).await {
                Ok(executions) => executions,
                Err(err) if err.is_retryable() => {
                    warn!(task_id, execution_id, attempt, error = %err, "execution fetch failed; retrying");
                    continue;
                }
                Err(err) => return Err(err),
            };

            match executions.into_iter().find(|execution| execution.id == execution_id) {
                Some(execution) if execution.status.is_terminal() => {
                    info!(task_id, execution_id, attempt, status = %execution.status, "execution settled");
                    return settle(execution);
                }
                Some(execution) => {
                    debug!(task_id, execution_id, attempt, status = %execution.status, "execution still in progress");
                }
                None => {
                    debug!(task_id, execution_id, attempt, "execution not listed yet");
                }
            }
        }

        warn!(
            task_id,
            execution_id,
            attempts = self.config.max_attempts,
            "gave up waiting for execution"
        );
        Err(SearchwatchError::ExecutionTimedOut {
            execution_id: execution_id.to_string(),
            attempts: self.config.max_attempts,
        })
    }
}

fn settle(execution: TaskExecution) -> Result<TaskExecution> {
    if execution.status != ExecutionStatus::Failed {
        return Ok(execution);
    }
    let message = execution
        .error_message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .unwrap_or(FALLBACK_FAILURE_MESSAGE)
        .to_string();
    Err(SearchwatchError::ExecutionFailed {
        execution_id: execution.id,
        message,
    })
}
