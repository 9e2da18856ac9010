//! User model definitions

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{is_valid_email, min_chars, required_trimmed, Validator};
use crate::Result;

pub const MIN_NAME_CHARS: usize = 2;
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Role granted to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err("Role must be either user or admin".to_string()),
        }
    }
}

/// Stored user record, including the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new record from an already hashed password
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Lightweight projection embedded in task responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Raw registration payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Registration that passed validation. The password is still plaintext.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterInput {
    pub fn validate(&self) -> Result<Registration> {
        let mut v = Validator::new();

        let name = v.check(
            "name",
            required_trimmed(self.name.as_deref(), "Name")
                .and_then(|name| min_chars(name, MIN_NAME_CHARS, "Name")),
        );
        let email = v.check("email", validate_email(self.email.as_deref()));
        let password = v.check("password", validate_password(self.password.as_deref()));
        let role = match self.role.as_deref() {
            None => Some(Role::default()),
            Some(raw) => v.check("role", raw.parse::<Role>()),
        };

        let registration = match (name, email, password, role) {
            (Some(name), Some(email), Some(password), Some(role)) => Some(Registration {
                name,
                email,
                password,
                role,
            }),
            _ => None,
        };
        v.finish_with(registration)
    }
}

/// Raw login payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login credentials that passed validation
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> Result<Credentials> {
        let mut v = Validator::new();

        let email = v.check("email", validate_email(self.email.as_deref()));
        let password = v.check(
            "password",
            match self.password.as_deref() {
                Some(p) if !p.is_empty() => Ok(p.to_string()),
                _ => Err("Password is required".to_string()),
            },
        );

        let credentials = match (email, password) {
            (Some(email), Some(password)) => Some(Credentials { email, password }),
            _ => None,
        };
        v.finish_with(credentials)
    }
}

/// Trim and lowercase an email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: Option<&str>) -> std::result::Result<String, String> {
    let normalized = required_trimmed(email, "Email").map(|e| normalize_email(&e))?;
    if is_valid_email(&normalized) {
        Ok(normalized)
    } else {
        Err("Please provide a valid email".to_string())
    }
}

fn validate_password(password: Option<&str>) -> std::result::Result<String, String> {
    match password {
        None | Some("") => Err("Password is required".to_string()),
        Some(p) if p.chars().count() < MIN_PASSWORD_CHARS => Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_CHARS
        )),
        Some(p) => Ok(p.to_string()),
    }
}
