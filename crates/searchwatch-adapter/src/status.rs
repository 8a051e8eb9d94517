/*
[INPUT]:  Persisted task fields (is_active, notify_behavior, condition_met, last execution)
[OUTPUT]: DisplayStatus with label/icon metadata
[POS]:    Domain layer - task status derivation
[UPDATE]: When the activity model or notify behaviors change
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::types::{NotifyBehavior, Task};

/// Status shown for a task. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Active,
    Paused,
    Completed,
}

impl DisplayStatus {
    pub const ALL: [DisplayStatus; 3] = [
        DisplayStatus::Active,
        DisplayStatus::Paused,
        DisplayStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Active => "active",
            DisplayStatus::Paused => "paused",
            DisplayStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Active => "Monitoring",
            DisplayStatus::Paused => "Paused",
            DisplayStatus::Completed => "Completed",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DisplayStatus::Active => "●",
            DisplayStatus::Paused => "⏸",
            DisplayStatus::Completed => "✓",
        }
    }

    /// No further scheduled runs are expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisplayStatus::Completed)
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}', expected active, paused or completed")]
pub struct ParseStatusError(String);

impl FromStr for DisplayStatus {
    type Err = ParseStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(DisplayStatus::Active),
            "paused" => Ok(DisplayStatus::Paused),
            "completed" => Ok(DisplayStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Derive the display status of a task from its persisted fields.
pub fn classify(task: &Task) -> DisplayStatus {
    classify_parts(
        &task.id,
        task.is_active,
        task.notify_behavior,
        task.completion_signal(),
    )
}

/// Same as [`classify`] for callers that only hold the individual fields.
///
/// A once-only task whose condition has been met is `Completed` whatever its
/// activity flag says. A missing flag falls back to `Active`.
pub fn classify_parts(
    task_id: &str,
    is_active: Option<bool>,
    notify_behavior: NotifyBehavior,
    completion_signal: bool,
) -> DisplayStatus {
    if notify_behavior == NotifyBehavior::Once && completion_signal {
        return DisplayStatus::Completed;
    }

    match is_active {
        Some(true) => DisplayStatus::Active,
        Some(false) => DisplayStatus::Paused,
        None => {
            warn!(task_id, "task has no activity flag; showing it as active");
            DisplayStatus::Active
        }
    }
}
