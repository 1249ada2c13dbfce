// Module exports for the job-board backend

pub mod models;
pub mod schema;
pub mod forms;
pub mod errors;
pub mod services;
pub mod config;
pub mod middleware;
pub mod handlers;
pub mod logger;

// Re-export common types
pub use crate::config::AppConfig;
pub use crate::config::DbPool;
pub use crate::errors::ApiError;
pub use crate::middleware::AuthenticatedUser;
pub use crate::models::UserAccount;
