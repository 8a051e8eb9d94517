/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy for how repeated condition matches trigger notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyBehavior {
    /// Notify on the first match, then the task is complete.
    #[default]
    Once,
    /// Notify on every match.
    Always,
    /// Notify only when the tracked state changes.
    TrackState,
}

impl NotifyBehavior {
    pub const ALL: [NotifyBehavior; 3] = [
        NotifyBehavior::Once,
        NotifyBehavior::Always,
        NotifyBehavior::TrackState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyBehavior::Once => "once",
            NotifyBehavior::Always => "always",
            NotifyBehavior::TrackState => "track_state",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NotifyBehavior::Once => "notify once, then stop monitoring",
            NotifyBehavior::Always => "notify every time the condition is met",
            NotifyBehavior::TrackState => "notify when the tracked state changes",
        }
    }
}

impl fmt::Display for NotifyBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Success => "success",
            ExecutionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Webhook,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 2] = [NotificationChannel::Email, NotificationChannel::Webhook];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Email => "email",
            NotificationChannel::Webhook => "webhook",
        }
    }
}

impl fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_behavior_uses_snake_case_on_the_wire() {
        let encoded = serde_json::to_string(&NotifyBehavior::TrackState).unwrap();
        assert_eq!(encoded, "\"track_state\"");

        let decoded: NotifyBehavior = serde_json::from_str("\"once\"").unwrap();
        assert_eq!(decoded, NotifyBehavior::Once);
    }

    #[test]
    fn only_success_and_failed_are_terminal() {
        assert!(ExecutionStatus::Success.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Pending.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }
}
