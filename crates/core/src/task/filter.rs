//! Task list filters
//!
//! [`TaskQuery`] is the loose set of query parameters a client sends;
//! [`TaskFilter`] is the fixed-shape filter it resolves to. The filter has a
//! canonical JSON form used as the distinguishing part of its cache key, so
//! two different filters never share a cache slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use super::time::local_day_bounds;
use crate::validation::Validator;
use crate::Result;

/// Query parameters accepted by the task list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Half-open due date range `[gte, lt)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueDateRange {
    pub gte: DateTime<Utc>,
    pub lt: DateTime<Utc>,
}

impl DueDateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.gte <= instant && instant < self.lt
    }
}

/// Resolved task filter. Every field is an exact-match constraint except
/// `due_date`, which matches a whole local calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDateRange>,
}

impl TaskQuery {
    /// Resolve into a filter. Empty parameters are treated as absent.
    pub fn resolve(&self) -> Result<TaskFilter> {
        let mut v = Validator::new();

        let filter = TaskFilter {
            status: present(&self.status).and_then(|raw| v.check("status", raw.parse())),
            assigned_to: present(&self.assigned_to).and_then(|raw| {
                v.check(
                    "assignedTo",
                    Uuid::parse_str(raw).map_err(|_| "AssignedTo must be a valid user ID".to_string()),
                )
            }),
            due_date: present(&self.due_date).and_then(|raw| {
                v.check(
                    "dueDate",
                    local_day_bounds(raw)
                        .map(|(gte, lt)| DueDateRange { gte, lt })
                        .map_err(|_| "Due date must be a valid date".to_string()),
                )
            }),
        };

        v.finish()?;
        Ok(filter)
    }
}

impl TaskFilter {
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_assignee(mut self, user_id: Uuid) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    pub fn with_due_date(mut self, range: DueDateRange) -> Self {
        self.due_date = Some(range);
        self
    }

    /// Whether `task` satisfies every constraint
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
            && self.assigned_to.map_or(true, |id| task.assigned_to == id)
            && self.due_date.map_or(true, |range| range.contains(task.due_date))
    }

    /// Canonical serialization. Field order is fixed by the struct, so equal
    /// filters always produce the same string and different ones never do.
    pub fn canonical(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
