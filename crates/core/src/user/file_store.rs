//! File-based user storage implementation
//!
//! Keeps users in memory and mirrors them to a JSON file on every write.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{User, UserProfile, UserRef};
use super::repository::UserRepository;
use crate::persist::{load_records, write_records};
use crate::{Error, Result};

/// User store backed by a JSON file
pub struct FileUserStore {
    /// Path to the JSON file, `None` for a purely in-memory store
    path: Option<PathBuf>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl FileUserStore {
    /// Open the store at `path`, loading existing users if the file exists
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let users: Vec<User> = load_records(&path).await?;

        Ok(Self {
            path: Some(path),
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        })
    }

    /// Store that never touches the disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            users: RwLock::new(HashMap::new()),
        }
    }

    async fn persist(&self, users: &HashMap<Uuid, User>) -> Result<()> {
        match &self.path {
            Some(path) => write_records(path, &users.values().collect::<Vec<_>>()).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for FileUserStore {
    async fn create(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::invalid_field("email", "User already exists"));
        }
        let mut next = users.clone();
        next.insert(user.id, user.clone());
        self.persist(&next).await?;
        *users = next;
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(UserProfile::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_refs(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserRef>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|u| (u.id, UserRef::from(u)))
            .collect())
    }
}
