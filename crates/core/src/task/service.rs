//! Task service
//!
//! Wraps every CRUD verb in one cache-consistency policy:
//!
//! - reads go to the cache first and populate it only after the store has
//!   confirmed the value exists;
//! - writes commit to the store and then invalidate, before the operation
//!   returns, the single-entity key `task:<id>` (update/delete) and the whole
//!   collection-query namespace `tasks:*`.
//!
//! The cache is never the system of record. With the cache down every
//! operation still returns the same result, only slower.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use super::filter::{TaskFilter, TaskQuery};
use super::model::{Task, TaskInput, TaskView};
use super::repository::TaskRepository;
use crate::cache::Cache;
use crate::user::{UserRef, UserRepository};
use crate::{Error, Result};

/// Expiry of every cached task entry
pub const CACHE_TTL: Duration = Duration::from_secs(60);

const TASK_QUERY_PATTERN: &str = "tasks:*";

fn task_key(id: Uuid) -> String {
    format!("task:{}", id)
}

fn query_key(filter: &TaskFilter) -> Result<String> {
    Ok(format!("tasks:{}", filter.canonical()?))
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
    cache: Cache,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, users: Arc<dyn UserRepository>, cache: Cache) -> Self {
        Self {
            tasks,
            users,
            cache,
        }
    }

    /// Validate and persist a new task
    pub async fn create(&self, input: &TaskInput) -> Result<TaskView> {
        let fields = input.validate_new()?;
        let assignee = self.require_assignee(fields.assigned_to).await?;

        let created = self.tasks.create(Task::new(fields)).await?;
        // Any cached listing may now be missing this task
        self.cache.invalidate_pattern(TASK_QUERY_PATTERN).await;

        tracing::info!(task_id = %created.id, "Task created");
        Ok(TaskView::resolve(
            created,
            &HashMap::from([(assignee.id, assignee)]),
        ))
    }

    /// Get one task, served from cache when possible
    pub async fn get_by_id(&self, id: Uuid) -> Result<TaskView> {
        let key = task_key(id);
        if let Some(cached) = self.cache.get::<TaskView>(&key).await {
            return Ok(cached);
        }

        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Task".to_string()))?;
        let view = self.resolve_one(task).await?;

        self.cache.set(&key, &view, CACHE_TTL).await;
        Ok(view)
    }

    /// List tasks matching the query, newest first. An empty list is a
    /// valid, cacheable result.
    pub async fn get_all(&self, query: &TaskQuery) -> Result<Vec<TaskView>> {
        let filter = query.resolve()?;
        self.find(&filter).await
    }

    /// List tasks matching an already resolved filter
    pub async fn find(&self, filter: &TaskFilter) -> Result<Vec<TaskView>> {
        let key = query_key(filter)?;
        if let Some(cached) = self.cache.get::<Vec<TaskView>>(&key).await {
            return Ok(cached);
        }

        let tasks = self.tasks.find(filter).await?;
        let views = self.resolve_many(tasks).await?;

        self.cache.set(&key, &views, CACHE_TTL).await;
        Ok(views)
    }

    /// Apply a partial update
    pub async fn update(&self, id: Uuid, input: &TaskInput) -> Result<TaskView> {
        let patch = input.validate_patch()?;

        let mut task = self
            .tasks
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Task".to_string()))?;
        if let Some(assigned_to) = patch.assigned_to {
            self.require_assignee(assigned_to).await?;
        }

        task.apply(patch);
        let updated = self.tasks.update(task).await?;
        self.invalidate_task(id).await;

        tracing::info!(task_id = %id, "Task updated");
        self.resolve_one(updated).await
    }

    /// Delete a task
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.tasks.delete(id).await? {
            return Err(Error::NotFound("Task".to_string()));
        }
        self.invalidate_task(id).await;

        tracing::info!(task_id = %id, "Task deleted");
        Ok(())
    }

    async fn invalidate_task(&self, id: Uuid) {
        self.cache.invalidate(&task_key(id)).await;
        self.cache.invalidate_pattern(TASK_QUERY_PATTERN).await;
    }

    async fn require_assignee(&self, user_id: Uuid) -> Result<UserRef> {
        self.users
            .find_refs(&[user_id])
            .await?
            .remove(&user_id)
            .ok_or_else(|| {
                Error::invalid_field("assignedTo", "AssignedTo must reference an existing user")
            })
    }

    async fn resolve_one(&self, task: Task) -> Result<TaskView> {
        let users = self.users.find_refs(&[task.assigned_to]).await?;
        Ok(TaskView::resolve(task, &users))
    }

    async fn resolve_many(&self, tasks: Vec<Task>) -> Result<Vec<TaskView>> {
        let mut ids: Vec<Uuid> = tasks.iter().map(|t| t.assigned_to).collect();
        ids.sort();
        ids.dedup();

        let users = self.users.find_refs(&ids).await?;
        Ok(tasks
            .into_iter()
            .map(|task| TaskView::resolve(task, &users))
            .collect())
    }
}
