//! Authentication service
//!
//! Registers accounts, exchanges credentials for access tokens and
//! resolves tokens back to user identifiers for the auth gate.

use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH};
use crate::crypto;
use crate::database::{Repository, User};
use crate::error::{AppError, Result};
use std::sync::Arc;

/// Service for account registration and token handling
#[derive(Clone)]
pub struct AuthService {
    repo: Repository,
    secret: Arc<Vec<u8>>,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(repo: Repository, secret: Vec<u8>, token_ttl_hours: i64) -> Self {
        Self {
            repo,
            secret: Arc::new(secret),
            token_ttl_hours,
        }
    }

    /// Register a new account
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();

        if username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Username must be at most {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        tracing::info!("Registering user: {}", username);

        let hash = crypto::hash_password(password)?;
        let user = self.repo.create_user(username, &hash).await?;

        tracing::info!("User registered: {}", user.id);
        Ok(user)
    }

    /// Exchange credentials for a signed token.
    ///
    /// Unknown users and wrong passwords both yield `Unauthenticated`.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = match self.repo.find_user_by_username(username.trim()).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Login attempt for unknown user");
                return Err(AppError::Unauthenticated);
            }
        };

        if !crypto::verify_password(password, &user.password_hash)? {
            tracing::warn!("Login attempt with wrong password for user: {}", user.id);
            return Err(AppError::Unauthenticated);
        }

        tracing::info!("User logged in: {}", user.id);
        crypto::issue_token(&user.id, &self.secret, self.token_ttl_hours)
    }

    /// Resolve a bearer token to its user identifier
    pub fn authenticate(&self, token: &str) -> Result<String> {
        crypto::verify_token(token, &self.secret).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_service() -> AuthService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        AuthService::new(Repository::new(pool), b"secret".to_vec(), 1)
    }

    #[tokio::test]
    async fn test_register_login_authenticate() {
        let service = create_test_service().await;

        let user = service.register("alice", "password1").await.unwrap();
        let token = service.login("alice", "password1").await.unwrap();

        assert_eq!(service.authenticate(&token).unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = create_test_service().await;

        assert!(matches!(
            service.register("   ", "password1").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.register("bob", "short").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate() {
        let service = create_test_service().await;

        service.register("alice", "password1").await.unwrap();
        assert!(matches!(
            service.register(" alice ", "password2").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_look_alike() {
        let service = create_test_service().await;
        service.register("alice", "password1").await.unwrap();

        assert!(matches!(
            service.login("alice", "wrong-password").await,
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(
            service.login("nobody", "password1").await,
            Err(AppError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_garbage() {
        let service = create_test_service().await;

        assert!(matches!(
            service.authenticate("garbage"),
            Err(AppError::Unauthenticated)
        ));
    }
}
