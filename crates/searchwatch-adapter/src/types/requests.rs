/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Deserializer, Serialize};

use super::enums::{NotificationChannel, NotifyBehavior};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub search_query: String,
    pub condition_description: String,
    pub schedule: String,
    pub notify_behavior: NotifyBehavior,
    pub notification_channels: Vec<NotificationChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub is_active: bool,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_behavior: Option<NotifyBehavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_channels: Option<Vec<NotificationChannel>>,
    /// `Some(None)` clears the stored address with an explicit `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub notification_email: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub webhook_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A key that is present, even as `null`, deserializes to `Some`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateTaskRequest {
    pub fn activity(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_update_only_sends_flag() {
        let body = serde_json::to_value(UpdateTaskRequest::activity(false)).unwrap();
        assert_eq!(body, serde_json::json!({"is_active": false}));
        assert!(UpdateTaskRequest::default().is_empty());
    }

    #[test]
    fn cleared_contact_fields_serialize_as_null() {
        let request = UpdateTaskRequest {
            notification_email: Some(None),
            webhook_url: Some(Some("https://hooks.example.com/a".to_string())),
            ..UpdateTaskRequest::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "notification_email": null,
                "webhook_url": "https://hooks.example.com/a"
            })
        );

        let parsed: UpdateTaskRequest = serde_json::from_value(body).unwrap();
        assert_eq!(parsed, request);
        let untouched: UpdateTaskRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(untouched.notification_email, None);
    }
}
