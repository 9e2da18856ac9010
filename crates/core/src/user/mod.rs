//! User module
//!
//! Credential records, registration and login.

mod file_store;
mod model;
mod repository;
mod service;

pub use file_store::FileUserStore;
pub use model::*;
pub use repository::UserRepository;
pub use service::UserService;
