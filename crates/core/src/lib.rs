//! Core library for Taskboard
//!
//! This crate contains the core business logic, including:
//! - User registration, credentials and password hashing
//! - Task management with filtered queries
//! - The read-through cache and its invalidation policy

pub mod cache;
pub mod error;
pub mod password;
mod persist;
pub mod task;
pub mod user;
pub mod validation;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
