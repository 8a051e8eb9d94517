/*
[INPUT]:  Task identifiers, create/update payloads and bearer credentials
[OUTPUT]: Task records from the backend
[POS]:    HTTP layer - task CRUD endpoints (require auth)
[UPDATE]: When adding new task endpoints or changing payloads
*/

use reqwest::Method;

use crate::http::{Result, SearchwatchClient};
use crate::types::{CreateTaskRequest, Task, UpdateTaskRequest};

impl SearchwatchClient {
    /// List the caller's tasks
    ///
    /// GET /tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.authed_request(Method::GET, &["tasks"])?;
        self.send_json(builder).await
    }

    /// Fetch a single task
    ///
    /// GET /tasks/{id}
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let builder = self.authed_request(Method::GET, &["tasks", task_id])?;
        self.send_json(builder).await
    }

    /// Create a task
    ///
    /// POST /tasks
    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<Task> {
        let builder = self.authed_request(Method::POST, &["tasks"])?.json(req);
        self.send_json(builder).await
    }

    /// Apply a partial update
    ///
    /// PATCH /tasks/{id}
    pub async fn update_task(&self, task_id: &str, req: &UpdateTaskRequest) -> Result<Task> {
        let builder = self.authed_request(Method::PATCH, &["tasks", task_id])?.json(req);
        self.send_json(builder).await
    }

    /// Pause or resume a task
    ///
    /// PATCH /tasks/{id} with `{"is_active": ..}`
    pub async fn set_task_active(&self, task_id: &str, is_active: bool) -> Result<Task> {
        self.update_task(task_id, &UpdateTaskRequest::activity(is_active))
            .await
    }

    /// Delete a task
    ///
    /// DELETE /tasks/{id}
    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let builder = self.authed_request(Method::DELETE, &["tasks", task_id])?;
        self.send_empty(builder).await
    }
}
