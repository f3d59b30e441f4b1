//! Services module
//!
//! Business logic services that coordinate between routes and repository.

pub mod auth;
pub mod todos;

pub use auth::AuthService;
pub use todos::TodoService;
