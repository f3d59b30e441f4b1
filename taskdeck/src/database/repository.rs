//! Repository layer for database operations
//!
//! Every todo query is filtered by owner. A todo that exists but belongs
//! to another user is reported exactly like one that does not exist.

use super::models::*;
use crate::error::{AppError, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user account; fails with `Conflict` if the username is taken
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username already exists".to_string())
            }
            other => AppError::Database(other),
        })?;

        tracing::debug!("Created user: {}", id);
        Ok(user)
    }

    /// Look up a user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Create a todo owned by `user_id`
    pub async fn create_todo(&self, user_id: &str, req: CreateTodoRequest) -> Result<Todo> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, title, completed, user_id, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&req.title)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created todo: {} for user: {}", id, user_id);
        Ok(todo)
    }

    /// List a user's todos in insertion order
    pub async fn list_todos(&self, user_id: &str) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>(
            r#"
            SELECT * FROM todos
            WHERE user_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    /// Get one of a user's todos
    #[cfg(test)]
    pub async fn get_todo(&self, user_id: &str, id: &str) -> Result<Todo> {
        sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Apply the provided fields to one of a user's todos
    pub async fn update_todo(
        &self,
        user_id: &str,
        id: &str,
        req: UpdateTodoRequest,
    ) -> Result<Todo> {
        let now = Utc::now();

        let todo = sqlx::query_as::<_, Todo>(
            r#"
            UPDATE todos
            SET title = COALESCE(?, title),
                completed = COALESCE(?, completed),
                updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(&req.title)
        .bind(req.completed)
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        tracing::debug!("Updated todo: {}", id);
        Ok(todo)
    }

    /// Permanently delete one of a user's todos
    pub async fn delete_todo(&self, user_id: &str, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }

        tracing::debug!("Deleted todo: {}", id);
        Ok(())
    }
}
