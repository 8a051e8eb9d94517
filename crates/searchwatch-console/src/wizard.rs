/*
[INPUT]:  User edits, optional TaskTemplate or existing Task, TaskSink for persistence
[OUTPUT]: Validated step transitions, field-level errors, create/update requests
[POS]:    Domain layer - task creation/edit wizard state machine
[UPDATE]: When steps, validation rules or submit semantics change
[UPDATE]: 2026-09-26 Clear recorded preview when query or condition changes
*/

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use searchwatch_adapter::{
    CreateTaskRequest, NotificationChannel, NotifyBehavior, SearchwatchClient, SearchwatchError,
    Task, TaskExecution, TaskTemplate, UpdateTaskRequest,
};

use crate::schedule;

pub const MIN_NAME_LEN: usize = 3;
pub const MIN_QUERY_LEN: usize = 10;
pub const MIN_CONDITION_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    TemplateSelect,
    Query,
    Preview,
    Schedule,
    NotifyBehavior,
}

impl WizardStep {
    const CREATE: [WizardStep; 5] = [
        WizardStep::TemplateSelect,
        WizardStep::Query,
        WizardStep::Preview,
        WizardStep::Schedule,
        WizardStep::NotifyBehavior,
    ];

    const EDIT: [WizardStep; 4] = [
        WizardStep::Query,
        WizardStep::Preview,
        WizardStep::Schedule,
        WizardStep::NotifyBehavior,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::TemplateSelect => "Template",
            WizardStep::Query => "Query",
            WizardStep::Preview => "Preview",
            WizardStep::Schedule => "Schedule",
            WizardStep::NotifyBehavior => "Notifications",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit { task_id: String },
}

/// Fields a validation message can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    SearchQuery,
    ConditionDescription,
    Schedule,
    NotificationChannels,
    NotificationEmail,
    WebhookUrl,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::SearchQuery => "search_query",
            Field::ConditionDescription => "condition_description",
            Field::Schedule => "schedule",
            Field::NotificationChannels => "notification_channels",
            Field::NotificationEmail => "notification_email",
            Field::WebhookUrl => "webhook_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("{step}: {errors}")]
    Invalid { step: WizardStep, errors: FieldErrors },
    #[error("Already at the last step")]
    NoNextStep,
    #[error("Submit is only available on the last step")]
    NotAtFinalStep,
    #[error("Templates can only be applied when creating a task")]
    TemplateUnavailable,
    #[error("Wizard is closed")]
    Closed,
    #[error(transparent)]
    Submit(#[from] SearchwatchError),
}

/// Editable task fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    pub search_query: String,
    pub condition_description: String,
    pub schedule: String,
    pub notify_behavior: NotifyBehavior,
    pub notification_channels: Vec<NotificationChannel>,
    pub notification_email: Option<String>,
    pub webhook_url: Option<String>,
    pub template_id: Option<String>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            search_query: String::new(),
            condition_description: String::new(),
            schedule: schedule::DEFAULT_SCHEDULE.to_string(),
            notify_behavior: NotifyBehavior::default(),
            notification_channels: vec![NotificationChannel::Email],
            notification_email: None,
            webhook_url: None,
            template_id: None,
        }
    }
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            search_query: task.search_query.clone(),
            condition_description: task.condition_description.clone(),
            schedule: task.schedule.clone(),
            notify_behavior: task.notify_behavior,
            notification_channels: task.notification_channels.clone(),
            notification_email: task.notification_email.clone(),
            webhook_url: task.webhook_url.clone(),
            template_id: None,
        }
    }

    pub fn to_create_request(&self) -> CreateTaskRequest {
        CreateTaskRequest {
            name: self.name.trim().to_string(),
            search_query: self.search_query.trim().to_string(),
            condition_description: self.condition_description.trim().to_string(),
            schedule: self.schedule.trim().to_string(),
            notify_behavior: self.notify_behavior,
            notification_channels: self.notification_channels.clone(),
            notification_email: non_blank(&self.notification_email),
            webhook_url: non_blank(&self.webhook_url),
            is_active: true,
        }
    }

    pub fn to_update_request(&self) -> UpdateTaskRequest {
        let create = self.to_create_request();
        UpdateTaskRequest {
            name: Some(create.name),
            search_query: Some(create.search_query),
            condition_description: Some(create.condition_description),
            schedule: Some(create.schedule),
            notify_behavior: Some(create.notify_behavior),
            notification_channels: Some(create.notification_channels),
            notification_email: Some(create.notification_email),
            webhook_url: Some(create.webhook_url),
            is_active: None,
        }
    }

    fn has_channel(&self, channel: NotificationChannel) -> bool {
        self.notification_channels.contains(&channel)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Validation for one step; empty when the step passes.
pub fn validate_step(step: WizardStep, draft: &TaskDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();
    match step {
        WizardStep::TemplateSelect => {}
        WizardStep::Query => {
            if draft.name.trim().chars().count() < MIN_NAME_LEN {
                errors.insert(
                    Field::Name,
                    format!("Name must be at least {MIN_NAME_LEN} characters"),
                );
            }
            if draft.search_query.trim().chars().count() < MIN_QUERY_LEN {
                errors.insert(
                    Field::SearchQuery,
                    format!("Search query must be at least {MIN_QUERY_LEN} characters"),
                );
            }
        }
        WizardStep::Preview => {
            if draft.condition_description.trim().chars().count() < MIN_CONDITION_LEN {
                errors.insert(
                    Field::ConditionDescription,
                    format!("Condition must be at least {MIN_CONDITION_LEN} characters"),
                );
            }
        }
        WizardStep::Schedule => {
            if let Err(err) = schedule::validate(&draft.schedule) {
                errors.insert(Field::Schedule, err.to_string());
            }
        }
        WizardStep::NotifyBehavior => {
            if draft.notification_channels.is_empty() {
                errors.insert(
                    Field::NotificationChannels,
                    "Select at least one notification channel",
                );
            }
            if draft.has_channel(NotificationChannel::Webhook) && !is_web_url(&draft.webhook_url) {
                errors.insert(
                    Field::WebhookUrl,
                    "Webhook URL must be an absolute http(s) URL",
                );
            }
            if draft.has_channel(NotificationChannel::Email)
                && non_blank(&draft.notification_email).is_some_and(|email| !email.contains('@'))
            {
                errors.insert(Field::NotificationEmail, "Enter a valid email address");
            }
        }
    }
    errors
}

fn is_web_url(value: &Option<String>) -> bool {
    non_blank(value)
        .and_then(|raw| url::Url::parse(&raw).ok())
        .is_some_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Where a finished draft is persisted.
#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create(&self, request: &CreateTaskRequest) -> searchwatch_adapter::Result<Task>;

    async fn update(
        &self,
        task_id: &str,
        request: &UpdateTaskRequest,
    ) -> searchwatch_adapter::Result<Task>;
}

#[async_trait]
impl TaskSink for SearchwatchClient {
    async fn create(&self, request: &CreateTaskRequest) -> searchwatch_adapter::Result<Task> {
        self.create_task(request).await
    }

    async fn update(
        &self,
        task_id: &str,
        request: &UpdateTaskRequest,
    ) -> searchwatch_adapter::Result<Task> {
        self.update_task(task_id, request).await
    }
}

/// Linear, validated create/edit flow.
///
/// Forward moves are gated on the current step; backward moves never are.
#[derive(Debug, Clone)]
pub struct TaskWizard {
    mode: WizardMode,
    position: usize,
    draft: TaskDraft,
    initial: TaskDraft,
    errors: FieldErrors,
    preview: Option<TaskExecution>,
    submit_error: Option<String>,
    open: bool,
}

impl TaskWizard {
    pub fn create() -> Self {
        Self::with_draft(WizardMode::Create, TaskDraft::default())
    }

    pub fn edit(task: &Task) -> Self {
        Self::with_draft(
            WizardMode::Edit {
                task_id: task.id.clone(),
            },
            TaskDraft::from_task(task),
        )
    }

    fn with_draft(mode: WizardMode, draft: TaskDraft) -> Self {
        Self {
            mode,
            position: 0,
            initial: draft.clone(),
            draft,
            errors: FieldErrors::default(),
            preview: None,
            submit_error: None,
            open: true,
        }
    }

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn steps(&self) -> &'static [WizardStep] {
        match self.mode {
            WizardMode::Create => &WizardStep::CREATE,
            WizardMode::Edit { .. } => &WizardStep::EDIT,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.steps()[self.position]
    }

    /// 1-based position and total step count.
    pub fn progress(&self) -> (usize, usize) {
        (self.position + 1, self.steps().len())
    }

    pub fn is_first_step(&self) -> bool {
        self.position == 0
    }

    pub fn is_final_step(&self) -> bool {
        self.position + 1 == self.steps().len()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &TaskDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn preview(&self) -> Option<&TaskExecution> {
        self.preview.as_ref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Validate the current step and move forward on success.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        let step = self.step();
        let errors = validate_step(step, &self.draft);
        if !errors.is_empty() {
            debug!(step = %step, errors = errors.len(), "wizard step blocked");
            self.errors = errors.clone();
            return Err(WizardError::Invalid { step, errors });
        }

        self.errors = FieldErrors::default();
        if self.is_final_step() {
            return Err(WizardError::NoNextStep);
        }
        self.position += 1;
        debug!(from = %step, to = %self.step(), "wizard advanced");
        Ok(self.step())
    }

    /// Step backward without validating; stays put on the first step.
    pub fn back(&mut self) -> WizardStep {
        if self.position > 0 {
            self.position -= 1;
        }
        self.step()
    }

    pub fn apply_template(&mut self, template: &TaskTemplate) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.mode != WizardMode::Create {
            return Err(WizardError::TemplateUnavailable);
        }
        self.set_name(template.name.clone());
        self.set_search_query(template.search_query.clone());
        self.set_condition(template.condition_description.clone());
        self.set_schedule(template.schedule.clone());
        self.set_notify_behavior(template.notify_behavior);
        self.draft.template_id = Some(template.id.clone());
        info!(template_id = %template.id, "template applied to wizard");
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.draft.search_query {
            self.invalidate_preview("search query changed");
            self.draft.search_query = query;
        }
    }

    pub fn set_condition(&mut self, condition: impl Into<String>) {
        let condition = condition.into();
        if condition != self.draft.condition_description {
            self.invalidate_preview("condition changed");
            self.draft.condition_description = condition;
        }
    }

    pub fn set_schedule(&mut self, cron: impl Into<String>) {
        self.draft.schedule = cron.into();
    }

    pub fn set_notify_behavior(&mut self, behavior: NotifyBehavior) {
        self.draft.notify_behavior = behavior;
    }

    pub fn set_channels(&mut self, channels: Vec<NotificationChannel>) {
        self.draft.notification_channels = channels;
    }

    pub fn set_notification_email(&mut self, email: Option<String>) {
        self.draft.notification_email = email;
    }

    pub fn set_webhook_url(&mut self, url: Option<String>) {
        self.draft.webhook_url = url;
    }

    /// Keep a Run Now result for the Preview step.
    pub fn record_preview(&mut self, execution: TaskExecution) {
        debug!(execution_id = %execution.id, status = %execution.status, "preview recorded");
        self.preview = Some(execution);
    }

    fn invalidate_preview(&mut self, reason: &str) {
        if let Some(stale) = self.preview.take() {
            debug!(execution_id = %stale.id, reason, "preview invalidated");
        }
    }

    /// Validate every step, then create or update through `sink`.
    ///
    /// On success the wizard resets and closes. On failure it stays on the
    /// same step with the error kept in [`submit_error`](Self::submit_error).
    pub async fn submit<S>(&mut self, sink: &S) -> Result<Task, WizardError>
    where
        S: TaskSink + ?Sized,
    {
        self.ensure_open()?;
        if !self.is_final_step() {
            return Err(WizardError::NotAtFinalStep);
        }

        let mut errors = FieldErrors::default();
        let mut failing_step = None;
        for step in self.steps() {
            let step_errors = validate_step(*step, &self.draft);
            if !step_errors.is_empty() {
                failing_step.get_or_insert(*step);
                errors.extend(step_errors);
            }
        }
        if let Some(step) = failing_step {
            self.errors = errors.clone();
            return Err(WizardError::Invalid { step, errors });
        }
        self.errors = FieldErrors::default();
        self.submit_error = None;

        let result = match &self.mode {
            WizardMode::Create => sink.create(&self.draft.to_create_request()).await,
            WizardMode::Edit { task_id } => {
                sink.update(task_id, &self.draft.to_update_request()).await
            }
        };

        match result {
            Ok(task) => {
                info!(task_id = %task.id, mode = ?self.mode, "wizard submitted");
                self.reset();
                self.open = false;
                Ok(task)
            }
            Err(err) => {
                warn!(error = %err, step = %self.step(), "wizard submit failed");
                self.submit_error = Some(err.to_string());
                Err(WizardError::Submit(err))
            }
        }
    }

    /// Back to the first step with the starting draft.
    pub fn reset(&mut self) {
        self.position = 0;
        self.draft = match self.mode {
            WizardMode::Create => TaskDraft::default(),
            WizardMode::Edit { .. } => self.initial.clone(),
        };
        self.errors = FieldErrors::default();
        self.preview = None;
        self.submit_error = None;
    }

    pub fn cancel(&mut self) {
        self.reset();
        self.open = false;
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.open {
            Ok(())
        } else {
            Err(WizardError::Closed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use searchwatch_adapter::ExecutionStatus;
    use std::sync::Mutex;

    fn template() -> TaskTemplate {
        TaskTemplate {
            id: "tpl-tickets".to_string(),
            name: "Concert tickets".to_string(),
            description: "Know when tickets go on sale".to_string(),
            category: Some("Events".to_string()),
            search_query: "When do Radiohead 2026 tickets go on sale?".to_string(),
            condition_description: "Tickets are available to buy".to_string(),
            schedule: "0 */6 * * *".to_string(),
            notify_behavior: NotifyBehavior::Once,
        }
    }

    fn execution(id: &str) -> TaskExecution {
        TaskExecution {
            id: id.to_string(),
            task_id: "preview".to_string(),
            status: ExecutionStatus::Success,
            started_at: Utc::now(),
            completed_at: Some(Utc::now()),
            result: None,
            error_message: None,
            condition_met: Some(false),
            change_summary: None,
            grounding_sources: Vec::new(),
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            name: "Mortgage rates".to_string(),
            search_query: "What is the average 30 year mortgage rate?".to_string(),
            condition_description: "Rate drops below six percent".to_string(),
            schedule: "0 9 * * 1".to_string(),
            notify_behavior: NotifyBehavior::Always,
            is_active: Some(true),
            condition_met: false,
            last_known_state: None,
            notification_channels: vec![NotificationChannel::Email],
            notification_email: None,
            webhook_url: None,
            user_id: None,
            is_public: false,
            created_at: Utc::now(),
            updated_at: None,
            last_execution: None,
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        created: Mutex<Vec<CreateTaskRequest>>,
        updated: Mutex<Vec<(String, UpdateTaskRequest)>>,
        reject: bool,
    }

    #[async_trait]
    impl TaskSink for RecordingSink {
        async fn create(&self, request: &CreateTaskRequest) -> searchwatch_adapter::Result<Task> {
            if self.reject {
                return Err(SearchwatchError::Api {
                    code: 422,
                    message: "Task limit reached".to_string(),
                });
            }
            self.created.lock().unwrap().push(request.clone());
            let mut task = task("t-new");
            task.name = request.name.clone();
            Ok(task)
        }

        async fn update(
            &self,
            task_id: &str,
            request: &UpdateTaskRequest,
        ) -> searchwatch_adapter::Result<Task> {
            self.updated
                .lock()
                .unwrap()
                .push((task_id.to_string(), request.clone()));
            Ok(task(task_id))
        }
    }

    fn walk_to_final(wizard: &mut TaskWizard) {
        while !wizard.is_final_step() {
            wizard.advance().expect("step should validate");
        }
    }

    #[test]
    fn short_name_blocks_query_step_without_dropping_input() {
        let mut wizard = TaskWizard::create();
        wizard.advance().expect("template step is optional");
        assert_eq!(wizard.step(), WizardStep::Query);

        wizard.set_name("ab");
        wizard.set_search_query("Is the new console in stock?");
        let err = wizard.advance().expect_err("name too short");

        assert!(matches!(err, WizardError::Invalid { step: WizardStep::Query, .. }));
        assert_eq!(wizard.step(), WizardStep::Query);
        assert!(wizard.errors().contains(Field::Name));
        assert!(!wizard.errors().contains(Field::SearchQuery));
        assert_eq!(wizard.draft().name, "ab");
    }

    #[test]
    fn valid_query_step_advances_and_clears_errors() {
        let mut wizard = TaskWizard::create();
        wizard.advance().unwrap();
        wizard.set_name("ab");
        assert!(wizard.advance().is_err());

        wizard.set_name("abc");
        wizard.set_search_query("0123456789");
        assert_eq!(wizard.advance().unwrap(), WizardStep::Preview);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn query_lengths_are_measured_after_trimming() {
        let mut draft = TaskDraft::default();
        draft.name = "  ab  ".to_string();
        draft.search_query = "   short    ".to_string();
        let errors = validate_step(WizardStep::Query, &draft);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn back_never_validates_and_stops_at_first_step() {
        let mut wizard = TaskWizard::create();
        assert_eq!(wizard.back(), WizardStep::TemplateSelect);

        wizard.advance().unwrap();
        wizard.set_name("x");
        assert!(wizard.advance().is_err());
        assert_eq!(wizard.back(), WizardStep::TemplateSelect);
        assert_eq!(wizard.draft().name, "x");
        assert!(wizard.errors().contains(Field::Name));
    }

    #[test]
    fn template_prefills_every_field() {
        let mut wizard = TaskWizard::create();
        let template = template();
        wizard.apply_template(&template).unwrap();

        let draft = wizard.draft();
        assert_eq!(draft.name, template.name);
        assert_eq!(draft.search_query, template.search_query);
        assert_eq!(draft.condition_description, template.condition_description);
        assert_eq!(draft.schedule, template.schedule);
        assert_eq!(draft.notify_behavior, template.notify_behavior);
        assert_eq!(draft.template_id.as_deref(), Some("tpl-tickets"));
    }

    #[test]
    fn changing_query_after_template_clears_preview() {
        let mut wizard = TaskWizard::create();
        wizard.apply_template(&template()).unwrap();
        wizard.record_preview(execution("e1"));

        wizard.set_search_query(template().search_query);
        assert!(wizard.preview().is_some(), "same value keeps the preview");

        wizard.set_search_query("When do Radiohead 2027 tickets go on sale?");
        assert!(wizard.preview().is_none());

        wizard.record_preview(execution("e2"));
        wizard.set_condition("Tickets are under 100 dollars");
        assert!(wizard.preview().is_none());
    }

    #[test]
    fn notify_step_rules() {
        let mut draft = TaskDraft::default();
        draft.notification_channels.clear();
        assert!(validate_step(WizardStep::NotifyBehavior, &draft).contains(Field::NotificationChannels));

        draft.notification_channels = vec![NotificationChannel::Webhook];
        draft.webhook_url = Some("hooks/relative".to_string());
        assert!(validate_step(WizardStep::NotifyBehavior, &draft).contains(Field::WebhookUrl));
        draft.webhook_url = Some("https://hooks.example.com/watch".to_string());
        assert!(validate_step(WizardStep::NotifyBehavior, &draft).is_empty());

        draft.notification_channels = vec![NotificationChannel::Email];
        draft.notification_email = Some("not-an-address".to_string());
        assert!(validate_step(WizardStep::NotifyBehavior, &draft).contains(Field::NotificationEmail));
        draft.notification_email = None;
        assert!(validate_step(WizardStep::NotifyBehavior, &draft).is_empty());
    }

    #[test]
    fn schedule_step_rejects_bad_cron() {
        let mut draft = TaskDraft::default();
        draft.schedule = "every day".to_string();
        let errors = validate_step(WizardStep::Schedule, &draft);
        assert!(errors.get(Field::Schedule).is_some());
    }

    #[tokio::test]
    async fn submit_creates_then_resets_and_closes() {
        let sink = RecordingSink::default();
        let mut wizard = TaskWizard::create();
        wizard.apply_template(&template()).unwrap();
        walk_to_final(&mut wizard);
        assert_eq!(wizard.step(), WizardStep::NotifyBehavior);

        let task = wizard.submit(&sink).await.expect("submit");

        assert_eq!(task.name, "Concert tickets");
        assert!(!wizard.is_open());
        assert_eq!(wizard.draft(), &TaskDraft::default());
        assert_eq!(wizard.step(), WizardStep::TemplateSelect);
        let created = sink.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].is_active);
        assert_eq!(created[0].schedule, "0 */6 * * *");
    }

    #[tokio::test]
    async fn submit_failure_keeps_wizard_open_on_same_step() {
        let sink = RecordingSink {
            reject: true,
            ..RecordingSink::default()
        };
        let mut wizard = TaskWizard::create();
        wizard.apply_template(&template()).unwrap();
        walk_to_final(&mut wizard);

        let err = wizard.submit(&sink).await.expect_err("backend rejects");

        assert!(matches!(err, WizardError::Submit(_)));
        assert!(wizard.is_open());
        assert_eq!(wizard.step(), WizardStep::NotifyBehavior);
        assert_eq!(
            wizard.submit_error(),
            Some("API error (code 422): Task limit reached")
        );
        assert_eq!(wizard.draft().name, "Concert tickets");
    }

    #[tokio::test]
    async fn submit_requires_final_step() {
        let sink = RecordingSink::default();
        let mut wizard = TaskWizard::create();
        assert!(matches!(
            wizard.submit(&sink).await,
            Err(WizardError::NotAtFinalStep)
        ));
    }

    #[tokio::test]
    async fn edit_mode_skips_templates_and_updates() {
        let sink = RecordingSink::default();
        let mut wizard = TaskWizard::edit(&task("t2"));
        assert_eq!(wizard.step(), WizardStep::Query);
        assert_eq!(wizard.progress(), (1, 4));
        assert!(matches!(
            wizard.apply_template(&template()),
            Err(WizardError::TemplateUnavailable)
        ));

        walk_to_final(&mut wizard);
        wizard.submit(&sink).await.expect("update");

        let updated = sink.updated.lock().unwrap();
        assert_eq!(updated[0].0, "t2");
        assert_eq!(updated[0].1.name.as_deref(), Some("Mortgage rates"));
        assert_eq!(updated[0].1.is_active, None);
        assert_eq!(updated[0].1.notification_email, Some(None));
    }
}
