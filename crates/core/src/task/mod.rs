//! Task module
//!
//! This module contains task-related types, storage and the cached service.

mod file_store;
mod filter;
mod model;
mod repository;
mod service;
mod time;

pub use file_store::FileTaskStore;
pub use filter::{DueDateRange, TaskFilter, TaskQuery};
pub use model::*;
pub use repository::TaskRepository;
pub use service::{TaskService, CACHE_TTL};
pub use time::{local_day_bounds, parse_timestamp};
