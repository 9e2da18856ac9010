//! User repository trait
//!
//! Defines the interface for credential storage operations.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::model::{User, UserProfile, UserRef};
use crate::Result;

/// Repository interface for user records
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with a validation error on `email` if the
    /// email is already registered.
    async fn create(&self, user: User) -> Result<User>;

    /// Get a user by ID, without the password hash
    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// Find the full record, hash included, by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Resolve name/email projections for a set of IDs. Unknown IDs are
    /// absent from the result.
    async fn find_refs(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserRef>>;
}
