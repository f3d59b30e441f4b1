//! Application configuration
//!
//! Central location for configuration constants and the runtime
//! server configuration loaded from the environment.

use crate::error::{AppError, Result};
use rand::RngCore;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// ===== Local Workspace =====

/// Interval at which views re-read their collection from storage
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Interval between upcoming-task checks
pub const UPCOMING_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Tasks due within this many hours count as upcoming
pub const UPCOMING_WINDOW_HOURS: i64 = 48;

/// Storage slot keys, one per collection
pub const TASKS_KEY: &str = "tasks";
pub const NOTES_KEY: &str = "notes";
pub const PROJECTS_KEY: &str = "projects";
pub const TASK_TYPES_KEY: &str = "taskTypes";

/// Placeholder stored in date-like fields that are unset
pub const UNSET_SENTINEL: &str = "-";

pub const DEFAULT_TASK_ICON: &str = "📝";
pub const DEFAULT_ESTIMATED_TIME: &str = "0h";
pub const DEFAULT_NOTE_COLOR: &str = "bg-yellow-100";

// ===== Accounts =====

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum username length accepted at registration
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Size of a generated token secret in bytes
const GENERATED_SECRET_SIZE: usize = 32;

// ===== Server =====

const DEFAULT_PORT: &str = "5000";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_TOKEN_TTL_HOURS: &str = "24";
const DATABASE_FILE: &str = "taskdeck.db";

/// Runtime configuration for the HTTP backend
#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub token_secret: Vec<u8>,
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    /// Load configuration from `TASKDECK_*` environment variables
    pub fn from_env() -> Result<Self> {
        let token_secret = match env::var("TASKDECK_TOKEN_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.trim().as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "TASKDECK_TOKEN_SECRET not set, generating a random secret; \
                     issued tokens will not survive a restart"
                );
                generate_secret()
            }
        };

        let token_ttl_hours: i64 = try_load("TASKDECK_TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(AppError::Validation(
                "TASKDECK_TOKEN_TTL_HOURS must be positive".to_string(),
            ));
        }

        Ok(Self {
            port: try_load("TASKDECK_PORT", DEFAULT_PORT)?,
            data_dir: try_load("TASKDECK_DATA_DIR", DEFAULT_DATA_DIR)?,
            token_secret,
            token_ttl_hours,
        })
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| AppError::Validation(format!("Invalid {key} value '{raw}': {e}")))
}

fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; GENERATED_SECRET_SIZE];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_load_falls_back_to_default() {
        let port: u16 = try_load("TASKDECK_TEST_UNSET_PORT", "5000").unwrap();
        assert_eq!(port, 5000);
    }

    #[test]
    fn test_try_load_rejects_garbage() {
        let result: Result<u16> = try_load("TASKDECK_TEST_UNSET_PORT", "not-a-port");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_generated_secret_is_random() {
        assert_eq!(generate_secret().len(), GENERATED_SECRET_SIZE);
        assert_ne!(generate_secret(), generate_secret());
    }
}
