/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: 2026-09-22 accept naive timestamps from the backend as UTC
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::enums::{ExecutionStatus, NotificationChannel, NotifyBehavior};

/// A persisted monitoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub search_query: String,
    #[serde(default)]
    pub condition_description: String,
    pub schedule: String,
    #[serde(default)]
    pub notify_behavior: NotifyBehavior,
    /// Activity flag. Older records may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub condition_met: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_state: Option<Value>,
    #[serde(default)]
    pub notification_channels: Vec<NotificationChannel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(with = "serde_helpers::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "serde_helpers::timestamp_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<TaskExecution>,
}

impl Task {
    /// True when the most recent known run (or the task itself) reports the
    /// condition as met.
    pub fn completion_signal(&self) -> bool {
        self.condition_met
            || self
                .last_execution
                .as_ref()
                .and_then(|execution| execution.condition_met)
                .unwrap_or(false)
    }
}

/// One run of a task's search and condition check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskExecution {
    pub id: String,
    pub task_id: String,
    pub status: ExecutionStatus,
    #[serde(with = "serde_helpers::timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(
        default,
        with = "serde_helpers::timestamp_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExecutionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_met: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_summary: Option<String>,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}

impl TaskExecution {
    /// Answer text, whichever of `answer`/`summary` the backend filled in.
    pub fn answer(&self) -> Option<&str> {
        let result = self.result.as_ref()?;
        filled(&result.answer).or_else(|| filled(&result.summary))
    }

    /// Sources cited for this run, from the result payload or the top level.
    pub fn sources(&self) -> &[GroundingSource] {
        match self.result.as_ref() {
            Some(result) if !result.grounding_sources.is_empty() => &result.grounding_sources,
            _ => &self.grounding_sources,
        }
    }

    /// Wall-clock duration for terminal executions.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.started_at)
    }
}

fn filled(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_met: Option<bool>,
    #[serde(default)]
    pub grounding_sources: Vec<GroundingSource>,
}

/// A cited URL backing an AI-generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    #[serde(alias = "uri")]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Preset used to pre-fill the task wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub search_query: String,
    #[serde(default)]
    pub condition_description: String,
    pub schedule: String,
    #[serde(default)]
    pub notify_behavior: NotifyBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub max_users: u32,
    pub current_users: u32,
    pub available_slots: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStats {
    pub capacity: Capacity,
}

impl PublicStats {
    pub fn signups_open(&self) -> bool {
        self.capacity.available_slots > 0
    }
}

mod serde_helpers {
    use chrono::{DateTime, NaiveDateTime, Utc};

    fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|err| format!("invalid timestamp '{raw}': {err}"))
    }

    pub mod timestamp {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw = String::deserialize(deserializer)?;
            super::parse(&raw).map_err(serde::de::Error::custom)
        }

        pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
    }

    pub mod timestamp_option {
        use chrono::{DateTime, SecondsFormat, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                Some(raw) if !raw.trim().is_empty() => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => {
                    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
                }
                None => serializer.serialize_none(),
            }
        }
    }
}
