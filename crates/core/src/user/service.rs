//! User service
//!
//! Registration runs as an explicit pipeline: validate, hash, persist.

use std::sync::Arc;

use uuid::Uuid;

use super::model::{LoginInput, RegisterInput, User, UserProfile};
use super::repository::UserRepository;
use crate::password::{compare_password, hash_password};
use crate::{Error, Result};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new user and return their public profile
    pub async fn register(&self, input: &RegisterInput) -> Result<UserProfile> {
        let registration = input.validate()?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(Error::invalid_field("email", "User already exists"));
        }

        let password_hash = hash_password(&registration.password)?;
        let user = User::new(
            registration.name,
            registration.email,
            password_hash,
            registration.role,
        );
        let created = self.users.create(user).await?;

        tracing::info!(user_id = %created.id, role = created.role.as_str(), "User registered");
        Ok(UserProfile::from(&created))
    }

    /// Check credentials and return the matching profile
    pub async fn login(&self, input: &LoginInput) -> Result<UserProfile> {
        let credentials = input.validate()?;

        let user = self
            .users
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| Error::Unauthenticated(INVALID_CREDENTIALS.to_string()))?;

        if !compare_password(&credentials.password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(Error::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        Ok(UserProfile::from(&user))
    }

    /// Load a profile by ID
    pub async fn profile(&self, id: Uuid) -> Result<Option<UserProfile>> {
        self.users.get(id).await
    }
}
