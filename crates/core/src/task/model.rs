//! Task model definitions

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::parse_timestamp;
use crate::user::UserRef;
use crate::validation::{min_chars, required_trimmed, Validator};
use crate::Result;

pub const MIN_TITLE_CHARS: usize = 3;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("Status must be one of: {}", allowed.join(", "))
            })
    }
}

/// Stored task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a task record from validated fields
    pub fn new(fields: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            due_date: fields.due_date,
            assigned_to: fields.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Unset fields are left as they are.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
    }
}

/// Validated fields for a new task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Uuid,
}

/// Validated partial update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

/// Raw task fields as sent by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl TaskInput {
    /// Validate a create request. Every field except `status` is required.
    pub fn validate_new(&self) -> Result<NewTask> {
        let mut v = Validator::new();

        let title = v.check("title", validate_title(self.title.as_deref()));
        let description = v.check(
            "description",
            required_trimmed(self.description.as_deref(), "Description"),
        );
        let status = match self.status.as_deref() {
            None => Some(TaskStatus::default()),
            Some(raw) => v.check("status", raw.parse()),
        };
        let due_date = v.check("dueDate", validate_due_date(self.due_date.as_deref()));
        let assigned_to = v.check(
            "assignedTo",
            validate_assignee(self.assigned_to.as_deref()),
        );

        let fields = match (title, description, status, due_date, assigned_to) {
            (Some(title), Some(description), Some(status), Some(due_date), Some(assigned_to)) => {
                Some(NewTask {
                    title,
                    description,
                    status,
                    due_date,
                    assigned_to,
                })
            }
            _ => None,
        };
        v.finish_with(fields)
    }

    /// Validate an update request. Every field is optional, but a field that
    /// is present must satisfy the same rules as on create.
    pub fn validate_patch(&self) -> Result<TaskPatch> {
        let mut v = Validator::new();

        let patch = TaskPatch {
            title: self
                .title
                .as_deref()
                .and_then(|raw| v.check("title", validate_title(Some(raw)))),
            description: self.description.as_deref().and_then(|raw| {
                v.check("description", required_trimmed(Some(raw), "Description"))
            }),
            status: self
                .status
                .as_deref()
                .and_then(|raw| v.check("status", raw.parse())),
            due_date: self
                .due_date
                .as_deref()
                .and_then(|raw| v.check("dueDate", validate_due_date(Some(raw)))),
            assigned_to: self
                .assigned_to
                .as_deref()
                .and_then(|raw| v.check("assignedTo", validate_assignee(Some(raw)))),
        };

        v.finish()?;
        Ok(patch)
    }
}

fn validate_title(raw: Option<&str>) -> std::result::Result<String, String> {
    required_trimmed(raw, "Title").and_then(|title| min_chars(title, MIN_TITLE_CHARS, "Title"))
}

fn validate_due_date(raw: Option<&str>) -> std::result::Result<DateTime<Utc>, String> {
    match raw.map(str::trim) {
        None | Some("") => Err("Due date is required".to_string()),
        Some(raw) => parse_timestamp(raw).map_err(|_| "Due date must be a valid date".to_string()),
    }
}

fn validate_assignee(raw: Option<&str>) -> std::result::Result<Uuid, String> {
    match raw.map(str::trim) {
        None | Some("") => Err("AssignedTo is required".to_string()),
        Some(raw) => {
            Uuid::parse_str(raw).map_err(|_| "AssignedTo must be a valid user ID".to_string())
        }
    }
}

/// Assignment as rendered to clients: the resolved user, or the bare ID when
/// the referenced user no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    User(UserRef),
    Missing(Uuid),
}

impl Assignee {
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(user) => user.id,
            Self::Missing(id) => *id,
        }
    }
}

/// Task with its assignment resolved, as returned and cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    pub assigned_to: Assignee,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    /// Resolve the assignment of `task` against known users
    pub fn resolve(task: Task, users: &HashMap<Uuid, UserRef>) -> Self {
        let assigned_to = match users.get(&task.assigned_to) {
            Some(user) => Assignee::User(user.clone()),
            None => Assignee::Missing(task.assigned_to),
        };
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            due_date: task.due_date,
            assigned_to,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
