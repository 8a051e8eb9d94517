/*
[INPUT]:  Task identifiers, run options and bearer credentials
[OUTPUT]: Execution history, triggered executions and notification changelog
[POS]:    HTTP layer - execution endpoints (require auth)
[UPDATE]: When adding new execution endpoints or changing query parameters
*/

use reqwest::Method;

use crate::http::{Result, SearchwatchClient};
use crate::types::TaskExecution;

impl SearchwatchClient {
    /// Execution history for a task, newest first as returned by the backend
    ///
    /// GET /tasks/{id}/executions?limit={limit}
    pub async fn list_executions(
        &self,
        task_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<TaskExecution>> {
        let mut builder = self.authed_request(Method::GET, &["tasks", task_id, "executions"])?;
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        self.send_json(builder).await
    }

    /// Trigger a run outside the schedule
    ///
    /// POST /tasks/{id}/execute?suppress_notifications={bool}
    pub async fn execute_task(
        &self,
        task_id: &str,
        suppress_notifications: bool,
    ) -> Result<TaskExecution> {
        let mut builder = self.authed_request(Method::POST, &["tasks", task_id, "execute"])?;
        if suppress_notifications {
            builder = builder.query(&[("suppress_notifications", "true")]);
        }
        self.send_json(builder).await
    }

    /// Executions that triggered a notification
    ///
    /// GET /tasks/{id}/notifications?limit={limit}
    pub async fn list_notifications(
        &self,
        task_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<TaskExecution>> {
        let mut builder = self.authed_request(Method::GET, &["tasks", task_id, "notifications"])?;
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        self.send_json(builder).await
    }
}
