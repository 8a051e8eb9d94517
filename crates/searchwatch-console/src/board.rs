/*
[INPUT]:  SearchwatchClient, filter/sort choices, pause/resume/delete actions
[OUTPUT]: Current task list, filtered and sorted views, per-status counts
[POS]:    Domain layer - task board with wholesale refetch after mutations
[UPDATE]: When list filtering, sorting or mutation semantics change
[UPDATE]: 2026-10-16 A failed refetch no longer turns an applied mutation into an error
*/

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use searchwatch_adapter::{DisplayStatus, SearchwatchClient, SearchwatchError, Task, classify};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("A request for task {task_id} is already in progress")]
    Busy { task_id: String },
    #[error(transparent)]
    Api(#[from] SearchwatchError),
}

/// State of the local list after a mutation the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    Current,
    /// The refetch failed; the list still shows the pre-mutation tasks.
    Stale { reason: String },
}

impl Freshness {
    pub fn is_current(&self) -> bool {
        matches!(self, Freshness::Current)
    }
}

/// Narrowing applied to the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<DisplayStatus>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| classify(task) != status) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [
                    task.name.as_str(),
                    task.search_query.as_str(),
                    task.condition_description.as_str(),
                ]
                .iter()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskSort {
    /// Alphabetical, case-insensitive
    Name,
    /// Newest first
    #[default]
    Created,
    /// Most recently updated first; never-updated tasks use their creation time
    Updated,
}

impl TaskSort {
    pub fn apply(&self, tasks: &mut [Task]) {
        match self {
            TaskSort::Name => tasks.sort_by_cached_key(|task| task.name.to_lowercase()),
            TaskSort::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TaskSort::Updated => tasks.sort_by(|a, b| {
                let a = a.updated_at.unwrap_or(a.created_at);
                let b = b.updated_at.unwrap_or(b.created_at);
                b.cmp(&a)
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub active: usize,
    pub paused: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.active + self.paused + self.completed
    }

    pub fn get(&self, status: DisplayStatus) -> usize {
        match status {
            DisplayStatus::Active => self.active,
            DisplayStatus::Paused => self.paused,
            DisplayStatus::Completed => self.completed,
        }
    }
}

/// Task ids with a mutating request outstanding.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// `None` if `task_id` already has a request outstanding.
    pub fn try_acquire(&self, task_id: &str) -> Option<InFlightTicket> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(task_id.to_string()) {
            return None;
        }
        Some(InFlightTicket {
            ids: Arc::clone(&self.ids),
            task_id: task_id.to_string(),
        })
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(task_id)
    }
}

/// Releases the task id when dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    ids: Arc<Mutex<HashSet<String>>>,
    task_id: String,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.task_id);
    }
}

/// Last fetched task list plus the mutations that invalidate it.
pub struct TaskBoard<'a> {
    client: &'a SearchwatchClient,
    tasks: Mutex<Vec<Task>>,
    in_flight: InFlight,
}

impl<'a> TaskBoard<'a> {
    pub fn new(client: &'a SearchwatchClient) -> Self {
        Self {
            client,
            tasks: Mutex::new(Vec::new()),
            in_flight: InFlight::default(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Replace the local list with the backend's.
    pub async fn refresh(&self) -> Result<usize, BoardError> {
        let tasks = self.client.list_tasks().await?;
        let count = tasks.len();
        *self.lock_tasks() = tasks;
        debug!(count, "task board refreshed");
        Ok(count)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock_tasks().clone()
    }

    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.lock_tasks()
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
    }

    /// Pause or resume. An `Err` means the change was not applied.
    pub async fn set_active(&self, task_id: &str, is_active: bool) -> Result<Freshness, BoardError> {
        let _ticket = self.acquire(task_id)?;
        self.client.set_task_active(task_id, is_active).await?;
        info!(task_id, is_active, "task activity updated");
        Ok(self.refresh_after(task_id).await)
    }

    /// Delete. An `Err` means the task was not deleted.
    pub async fn delete(&self, task_id: &str) -> Result<Freshness, BoardError> {
        let _ticket = self.acquire(task_id)?;
        self.client.delete_task(task_id).await?;
        info!(task_id, "task deleted");
        Ok(self.refresh_after(task_id).await)
    }

    async fn refresh_after(&self, task_id: &str) -> Freshness {
        match self.refresh().await {
            Ok(_) => Freshness::Current,
            Err(err) => {
                warn!(task_id, error = %err, "refetch after mutation failed; list is stale");
                Freshness::Stale {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn filter(&self, filter: &TaskFilter) -> Vec<Task> {
        self.lock_tasks()
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    pub fn sorted(&self, sort: TaskSort) -> Vec<Task> {
        let mut tasks = self.tasks();
        sort.apply(&mut tasks);
        tasks
    }

    /// Filter then sort.
    pub fn view(&self, filter: &TaskFilter, sort: TaskSort) -> Vec<Task> {
        let mut tasks = self.filter(filter);
        sort.apply(&mut tasks);
        tasks
    }

    pub fn counts(&self) -> StatusCounts {
        self.lock_tasks()
            .iter()
            .fold(StatusCounts::default(), |mut counts, task| {
                match classify(task) {
                    DisplayStatus::Active => counts.active += 1,
                    DisplayStatus::Paused => counts.paused += 1,
                    DisplayStatus::Completed => counts.completed += 1,
                }
                counts
            })
    }

    fn acquire(&self, task_id: &str) -> Result<InFlightTicket, BoardError> {
        self.in_flight.try_acquire(task_id).ok_or_else(|| {
            warn!(task_id, "request already in flight; ignoring");
            BoardError::Busy {
                task_id: task_id.to_string(),
            }
        })
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<Task>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use searchwatch_adapter::{ClientConfig, Credentials, NotifyBehavior};
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: &str, name: &str, is_active: bool, created_day: u32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": name,
            "search_query": format!("{name} search query"),
            "condition_description": "Something changed",
            "schedule": "0 9 * * *",
            "notify_behavior": "always",
            "is_active": is_active,
            "created_at": format!("2026-09-{created_day:02}T08:00:00Z"),
        })
    }

    fn client_for(server: &MockServer) -> SearchwatchClient {
        SearchwatchClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .unwrap()
            .with_credentials(Credentials {
                api_key: "sk-board".to_string(),
            })
    }

    fn sample(id: &str, name: &str, created_day: u32, updated_day: Option<u32>) -> Task {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            search_query: format!("{name} search query"),
            condition_description: "Price drops below 500".to_string(),
            schedule: "0 9 * * *".to_string(),
            notify_behavior: NotifyBehavior::Always,
            is_active: Some(true),
            condition_met: false,
            last_known_state: None,
            notification_channels: Vec::new(),
            notification_email: None,
            webhook_url: None,
            user_id: None,
            is_public: false,
            created_at: Utc.with_ymd_and_hms(2026, 9, created_day, 8, 0, 0).unwrap(),
            updated_at: updated_day
                .map(|day| Utc.with_ymd_and_hms(2026, 9, day, 8, 0, 0).unwrap()),
            last_execution: None,
        }
    }

    fn names(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.name.as_str()).collect()
    }

    #[test]
    fn sort_orders() {
        let tasks = vec![
            sample("1", "banana", 1, Some(20)),
            sample("2", "Apple", 3, None),
            sample("3", "cherry", 2, Some(4)),
        ];

        let mut by_name = tasks.clone();
        TaskSort::Name.apply(&mut by_name);
        assert_eq!(names(&by_name), vec!["Apple", "banana", "cherry"]);

        let mut by_created = tasks.clone();
        TaskSort::Created.apply(&mut by_created);
        assert_eq!(names(&by_created), vec!["Apple", "cherry", "banana"]);

        let mut by_updated = tasks;
        TaskSort::Updated.apply(&mut by_updated);
        assert_eq!(names(&by_updated), vec!["banana", "cherry", "Apple"]);
    }

    #[test]
    fn search_is_case_insensitive_over_text_fields() {
        let task = sample("1", "GPU restock", 1, None);
        let by_name = TaskFilter {
            search: Some("gpu".to_string()),
            ..TaskFilter::default()
        };
        let by_condition = TaskFilter {
            search: Some("BELOW 500".to_string()),
            ..TaskFilter::default()
        };
        let miss = TaskFilter {
            search: Some("mortgage".to_string()),
            ..TaskFilter::default()
        };

        assert!(by_name.matches(&task));
        assert!(by_condition.matches(&task));
        assert!(!miss.matches(&task));
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn status_filter_uses_classifier() {
        let mut paused = sample("1", "paused", 1, None);
        paused.is_active = Some(false);
        let active = sample("2", "active", 1, None);
        let filter = TaskFilter {
            status: Some(DisplayStatus::Paused),
            search: None,
        };

        assert!(filter.matches(&paused));
        assert!(!filter.matches(&active));
    }

    #[test]
    fn in_flight_ticket_releases_on_drop() {
        let in_flight = InFlight::default();
        let ticket = in_flight.try_acquire("t1").expect("first acquire");
        assert!(in_flight.try_acquire("t1").is_none());
        assert!(in_flight.try_acquire("t2").is_some());

        drop(ticket);
        assert!(!in_flight.contains("t1"));
        assert!(in_flight.try_acquire("t1").is_some());
    }

    #[tokio::test]
    async fn mutations_refetch_the_whole_list() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/tasks/t1"))
            .and(body_json(serde_json::json!({"is_active": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t1", "Alpha", false, 1)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                task_json("t1", "Alpha", false, 1),
                task_json("t2", "Beta", true, 2),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let board = TaskBoard::new(&client);
        let freshness = board.set_active("t1", false).await.expect("pause");
        assert!(freshness.is_current());

        let counts = board.counts();
        assert_eq!(counts.paused, 1);
        assert_eq!(counts.active, 1);
        assert_eq!(counts.total(), 2);
        assert!(!board.in_flight().contains("t1"));
    }

    #[tokio::test]
    async fn second_mutation_for_same_task_is_refused() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/t1"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let board = TaskBoard::new(&client);
        let first = board.delete("t1");
        let second = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            board.delete("t1").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.expect("first delete"), Freshness::Current);
        assert!(matches!(second, Err(BoardError::Busy { task_id }) if task_id == "t1"));
        assert!(board.tasks().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_releases_the_task() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/t9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Task not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let board = TaskBoard::new(&client);
        let err = board.delete("t9").await.expect_err("missing task");

        assert!(matches!(err, BoardError::Api(ref api) if api.is_not_found()));
        assert!(!board.in_flight().contains("t9"));
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_refetch_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                task_json("t1", "Alpha", true, 1),
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/t1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let board = TaskBoard::new(&client);
        assert_eq!(board.refresh().await.expect("initial list"), 1);

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let freshness = board.delete("t1").await.expect("delete was applied");
        assert!(matches!(
            freshness,
            Freshness::Stale { ref reason } if reason.contains("database unavailable")
        ));
        assert_eq!(board.tasks().len(), 1);
        assert!(!board.in_flight().contains("t1"));
    }
}
