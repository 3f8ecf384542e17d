use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{task_error::TaskError, task_fields::TaskChanges, task_priority::TaskPriority};

pub const MAX_TAGS: usize = 10;
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_STATUS: &str = "active";

/// A user-owned to-do record.
///
/// Persisted with postcard and served as camelCase JSON, so no field may
/// carry `skip_serializing_if`: postcard is not self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    /// Informational; independent of `completed`.
    pub status: String,
    pub completed: bool,
    pub category: String,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Set once at creation, never rewritten.
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task from already-normalized changes. Absent fields take
    /// their defaults; a title is mandatory.
    pub fn create(owner: Uuid, changes: TaskChanges, now: DateTime<Utc>) -> Result<Self, TaskError> {
        let title = changes
            .title
            .ok_or_else(|| TaskError::Validation("Title is required".to_string()))?;

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            description: changes.description.unwrap_or_default(),
            priority: changes.priority.unwrap_or_default(),
            status: changes.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            completed: changes.completed.unwrap_or(false),
            category: changes.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            tags: changes.tags.unwrap_or_default(),
            due_date: changes.due_date.flatten(),
            owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite every field present in `changes`; leave the rest alone.
    /// `id`, `owner` and `created_at` are not reachable from here.
    pub fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }
}
