//! Task types
//!
//! Labels offered in the task and event dropdowns, persisted in the
//! `taskTypes` slot. A workspace that never saved its types sees the
//! built-in defaults.

use super::models::TaskType;
use crate::config::TASK_TYPES_KEY;
use crate::error::{AppError, Result};
use crate::storage::{next_id, LocalCollection, SlotStore};
use std::sync::Arc;

/// Which dropdown a type flag controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeScope {
    Tasks,
    Events,
}

/// Built-in task types
pub fn default_types() -> Vec<TaskType> {
    [
        (1, "Operational", "bg-blue-100", true, false),
        (2, "Technical", "bg-sky-100", true, false),
        (3, "Strategic", "bg-green-100", true, false),
        (4, "Hiring", "bg-emerald-100", true, false),
        (5, "Financial", "bg-yellow-100", true, false),
        (6, "Meeting", "bg-orange-100", false, true),
        (7, "Online call", "bg-purple-100", false, true),
    ]
    .into_iter()
    .map(|(id, name, color, for_tasks, for_events)| TaskType {
        id,
        name: name.to_string(),
        color: color.to_string(),
        for_tasks,
        for_events,
    })
    .collect()
}

/// Task type registry
#[derive(Clone)]
pub struct TaskTypeRegistry {
    types: LocalCollection<TaskType>,
}

impl TaskTypeRegistry {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            types: LocalCollection::with_default(store, TASK_TYPES_KEY, default_types),
        }
    }

    /// Stored types, or the defaults when none were saved
    pub async fn load(&self) -> Result<Vec<TaskType>> {
        self.types.load().await
    }

    /// Replace the stored types wholesale
    pub async fn save(&self, types: &[TaskType]) -> Result<()> {
        self.types.save(types).await?;
        tracing::info!("Saved {} task types", types.len());
        Ok(())
    }

    /// Drop every saved change and return to the built-in types
    pub async fn reset(&self) -> Result<()> {
        self.types.reset().await?;
        tracing::info!("Task types reset to defaults");
        Ok(())
    }

    /// Types offered when creating a task
    pub async fn for_tasks(&self) -> Result<Vec<TaskType>> {
        Ok(self.load().await?.into_iter().filter(|t| t.for_tasks).collect())
    }

    /// Types offered when creating an event
    pub async fn for_events(&self) -> Result<Vec<TaskType>> {
        Ok(self.load().await?.into_iter().filter(|t| t.for_events).collect())
    }

    /// Add a type shown for tasks only
    pub async fn add(&self, name: &str, color: &str) -> Result<TaskType> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Type name is required".to_string()));
        }

        let (task_type, _) = self
            .types
            .mutate(|all| {
                let task_type = TaskType {
                    id: next_id(all)?,
                    name: name.to_string(),
                    color: color.to_string(),
                    for_tasks: true,
                    for_events: false,
                };
                all.push(task_type.clone());
                Ok(task_type)
            })
            .await?;

        tracing::info!("Added task type {} ({})", task_type.id, task_type.name);
        Ok(task_type)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<TaskType> {
        let name = name.to_string();
        self.modify(id, |t| t.name = name).await
    }

    pub async fn recolor(&self, id: i64, color: &str) -> Result<TaskType> {
        let color = color.to_string();
        self.modify(id, |t| t.color = color).await
    }

    /// Flip whether a type is offered in the given dropdown
    pub async fn toggle(&self, id: i64, scope: TypeScope) -> Result<TaskType> {
        self.modify(id, |t| match scope {
            TypeScope::Tasks => t.for_tasks = !t.for_tasks,
            TypeScope::Events => t.for_events = !t.for_events,
        })
        .await
    }

    async fn modify<F>(&self, id: i64, change: F) -> Result<TaskType>
    where
        F: FnOnce(&mut TaskType),
    {
        let (task_type, _) = self
            .types
            .mutate(|all| {
                let task_type = all
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("task type {}", id)))?;
                change(task_type);
                Ok(task_type.clone())
            })
            .await?;

        Ok(task_type)
    }
}
