//! File-based task storage implementation
//!
//! Stores tasks as JSON in a file on disk.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::filter::TaskFilter;
use super::model::Task;
use super::repository::TaskRepository;
use crate::persist::{load_records, write_records};
use crate::{Error, Result};

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file, `None` for a purely in-memory store
    path: Option<PathBuf>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tasks: Vec<Task> = load_records(&path).await?;

        Ok(Self {
            path: Some(path),
            tasks: RwLock::new(tasks.into_iter().map(|t| (t.id, t)).collect()),
        })
    }

    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Persist the tasks to disk. Called with the write lock held so file
    /// writes are never reordered, and before the map is swapped so a failed
    /// write leaves the store unchanged.
    async fn persist(&self, tasks: &HashMap<Uuid, Task>) -> Result<()> {
        match &self.path {
            Some(path) => write_records(path, &tasks.values().collect::<Vec<_>>()).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskRepository for FileTaskStore {
    async fn create(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(Error::Storage(format!(
                "Task with ID {} already exists",
                task.id
            )));
        }
        let mut next = tasks.clone();
        next.insert(task.id, task.clone());
        self.persist(&next).await?;
        *tasks = next;
        Ok(task)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn find(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut found: Vec<Task> = tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        // Sort by created_at descending (newest first)
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update(&self, mut task: Task) -> Result<Task> {
        task.updated_at = Utc::now();
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(Error::NotFound("Task".to_string()));
        }
        let mut next = tasks.clone();
        next.insert(task.id, task.clone());
        self.persist(&next).await?;
        *tasks = next;
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&id) {
            return Ok(false);
        }
        let mut next = tasks.clone();
        next.remove(&id);
        self.persist(&next).await?;
        *tasks = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{local_day_bounds, DueDateRange, NewTask, TaskStatus};
    use chrono::{DateTime, Duration};
    use tempfile::TempDir;

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    fn task(title: &str, status: TaskStatus, due_date: DateTime<Utc>, assigned_to: Uuid) -> Task {
        Task::new(NewTask {
            title: title.to_string(),
            description: "A test description".to_string(),
            status,
            due_date,
            assigned_to,
        })
    }

    fn todo(title: &str) -> Task {
        task(title, TaskStatus::Todo, Utc::now(), Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_create_and_get_task() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(todo("Test task")).await.unwrap();
        let retrieved = store.get(created.id).await.unwrap();
        assert_eq!(retrieved, Some(created));

        // Non-existent task
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_sorts_newest_first() {
        let store = FileTaskStore::in_memory();

        let mut older = todo("Older");
        older.created_at = Utc::now() - Duration::minutes(5);
        store.create(older).await.unwrap();
        store.create(todo("Newer")).await.unwrap();

        let tasks = store.find(&TaskFilter::default()).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_find_applies_filter() {
        let store = FileTaskStore::in_memory();
        let alice = Uuid::new_v4();
        let (gte, lt) = local_day_bounds("2024-01-15").unwrap();

        store
            .create(task("Match", TaskStatus::Todo, gte + Duration::hours(9), alice))
            .await
            .unwrap();
        store
            .create(task("Wrong status", TaskStatus::Completed, gte, alice))
            .await
            .unwrap();
        store
            .create(task("Next day", TaskStatus::Todo, lt, alice))
            .await
            .unwrap();
        store
            .create(task("Other user", TaskStatus::Todo, gte, Uuid::new_v4()))
            .await
            .unwrap();

        let filter = TaskFilter::default()
            .with_status(TaskStatus::Todo)
            .with_assignee(alice)
            .with_due_date(DueDateRange { gte, lt });
        let found = store.find(&filter).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Match");
    }

    #[tokio::test]
    async fn test_update_task() {
        let (store, _temp) = create_test_store().await;
        let created = store.create(todo("Original title")).await.unwrap();

        let mut changed = created.clone();
        changed.title = "Updated title".to_string();
        changed.status = TaskStatus::InProgress;

        let result = store.update(changed).await.unwrap();
        assert_eq!(result.title, "Updated title");
        assert!(result.updated_at >= created.updated_at);

        let retrieved = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        match store.update(todo("Ghost")).await.unwrap_err() {
            Error::NotFound(_) => {}
            e => panic!("Expected NotFound error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, _temp) = create_test_store().await;
        let id = store.create(todo("Task to delete")).await.unwrap().id;

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());

        // Delete again should return false
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let task_id = {
            let store = FileTaskStore::new(&path).await.unwrap();
            store.create(todo("Persistent task")).await.unwrap().id
        };

        let store = FileTaskStore::new(&path).await.unwrap();
        let task = store.get(task_id).await.unwrap().unwrap();
        assert_eq!(task.title, "Persistent task");
    }

    #[tokio::test]
    async fn test_duplicate_task_error() {
        let (store, _temp) = create_test_store().await;

        let task = todo("Test task");
        store.create(task.clone()).await.unwrap();

        match store.create(task).await.unwrap_err() {
            Error::Storage(msg) => assert!(msg.contains("already exists")),
            e => panic!("Expected Storage error, got: {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        let created = store.create(todo("Old title")).await.unwrap();

        // A directory in place of the file makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let mut changed = created.clone();
        changed.title = "New title".to_string();
        assert!(matches!(store.update(changed).await, Err(Error::Io(_))));
        assert!(store.create(todo("Never stored")).await.is_err());
        assert!(store.delete(created.id).await.is_err());

        let tasks = store.find(&TaskFilter::default()).await.unwrap();
        assert_eq!(tasks, vec![created]);
    }
}
