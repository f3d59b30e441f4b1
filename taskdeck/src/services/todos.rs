//! Todos service
//!
//! Owner-scoped todo operations. Every call takes the caller's resolved
//! user identifier; records of other owners are invisible.

use crate::database::{CreateTodoRequest, Repository, Todo, UpdateTodoRequest};
use crate::error::Result;

/// Service for managing a caller's todos
#[derive(Clone)]
pub struct TodoService {
    repo: Repository,
}

impl TodoService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// List the caller's todos in insertion order
    pub async fn list(&self, user_id: &str) -> Result<Vec<Todo>> {
        self.repo.list_todos(user_id).await
    }

    /// Create a todo owned by the caller, not completed
    pub async fn create(&self, user_id: &str, title: Option<String>) -> Result<Todo> {
        tracing::info!("Creating todo for user: {}", user_id);

        let todo = self
            .repo
            .create_todo(user_id, CreateTodoRequest { title })
            .await?;

        tracing::info!("Todo created successfully: {}", todo.id);
        Ok(todo)
    }

    /// Apply the provided fields to one of the caller's todos
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        title: Option<String>,
        completed: Option<bool>,
    ) -> Result<Todo> {
        tracing::debug!("Updating todo: {}", id);

        let todo = self
            .repo
            .update_todo(user_id, id, UpdateTodoRequest { title, completed })
            .await?;

        tracing::debug!("Todo updated successfully: {}", todo.id);
        Ok(todo)
    }

    /// Delete one of the caller's todos
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        tracing::info!("Deleting todo: {}", id);

        self.repo.delete_todo(user_id, id).await?;

        tracing::info!("Todo deleted successfully: {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use crate::error::AppError;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::HashSet;

    async fn create_test_service() -> TodoService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        TodoService::new(Repository::new(pool))
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let service = create_test_service().await;

        service
            .create("alice", Some("Buy milk".to_string()))
            .await
            .unwrap();

        let todos = service.list("alice").await.unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Buy milk");
        assert!(!todos[0].completed);
        assert_eq!(todos[0].user_id, "alice");
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let service = create_test_service().await;

        let mut ids = HashSet::new();
        for i in 0..20 {
            let todo = service
                .create(if i % 2 == 0 { "alice" } else { "bob" }, Some(format!("t{}", i)))
                .await
                .unwrap();
            assert!(ids.insert(todo.id));
        }
    }

    #[tokio::test]
    async fn test_foreign_mutations_are_not_found() {
        let service = create_test_service().await;
        let todo = service
            .create("alice", Some("private".to_string()))
            .await
            .unwrap();

        assert!(matches!(
            service.update("bob", &todo.id, None, Some(true)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("bob", &todo.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.list("bob").await.unwrap().is_empty());

        let still_there = service.list("alice").await.unwrap();
        assert_eq!(still_there, vec![todo]);
    }

    #[tokio::test]
    async fn test_delete_missing_twice() {
        let service = create_test_service().await;
        service.create("alice", Some("keep".to_string())).await.unwrap();

        for _ in 0..2 {
            assert!(matches!(
                service.delete("alice", "does-not-exist").await,
                Err(AppError::NotFound(_))
            ));
        }

        assert_eq!(service.list("alice").await.unwrap().len(), 1);
    }
}
