//! TaskDeck library
//!
//! The owner-scoped todo backend (auth gate, repository, HTTP routes) and
//! the local workspace of tasks, notes, projects and task types.

pub mod app;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod routes;
pub mod services;
pub mod storage;
pub mod workspace;

pub use error::{AppError, Result};
