//! Task data structures.
//!
//! `Task` is the single persisted entity. `TaskDraft` is the same field set
//! before the store assigns an id, a creation time and the completion flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::Priority;

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Maximum category length in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// A to-do item as stored under `tasks-<username>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// ISO 8601 creation time. Empty means the record predates this field.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
}

/// The user-supplied part of a task, prior to creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

impl Task {
    /// Build a task from a draft. Only the store calls this.
    pub(crate) fn from_draft(draft: TaskDraft, id: String, created_at: String) -> Self {
        Task {
            id,
            title: draft.title,
            description: draft.description,
            completed: false,
            priority: draft.priority,
            due_date: draft.due_date,
            category: draft.category,
            created_at,
        }
    }

    /// Whether the record still lacks a creation time.
    pub fn is_legacy(&self) -> bool {
        self.created_at.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_uses_camel_case_keys() {
        let task = Task {
            id: "abc".into(),
            title: "Write report".into(),
            description: None,
            completed: false,
            priority: Priority::High,
            due_date: Some("2030-05-01T00:00:00Z".parse().unwrap()),
            category: Some("Work".into()),
            created_at: "2030-04-01T09:30:00.000Z".into(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2030-05-01T00:00:00Z");
        assert_eq!(json["createdAt"], "2030-04-01T09:30:00.000Z");
        assert_eq!(json["priority"], "high");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_legacy_record_without_created_at() {
        let raw = r#"{"id":"2023-01-01T10:00:00.000Z","title":"Old","completed":true,"priority":"low"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert!(task.is_legacy());
        assert!(task.completed);

        let raw_null = r#"{"id":"7","title":"Old","completed":false,"priority":"low","createdAt":null}"#;
        let task: Task = serde_json::from_str(raw_null).unwrap();
        assert!(task.is_legacy());
    }

    #[test]
    fn test_javascript_iso_dates_parse() {
        let raw = r#"{"id":"1","title":"T","completed":false,"priority":"urgent","dueDate":"2024-06-03T22:00:00.000Z","createdAt":"2024-06-01T08:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert!(task.due_date.is_some());
        assert!(!task.is_legacy());
    }
}
