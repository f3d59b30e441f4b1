//! Projects
//!
//! The project list shown in the sidebar, persisted in the `projects`
//! slot. Deleting a project leaves its tasks and notes in place.

use super::models::Project;
use crate::config::PROJECTS_KEY;
use crate::error::{AppError, Result};
use crate::storage::{next_id, LocalCollection, SlotStore};
use std::sync::Arc;

/// Project list operations
#[derive(Clone)]
pub struct ProjectList {
    projects: LocalCollection<Project>,
}

impl ProjectList {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            projects: LocalCollection::new(store, PROJECTS_KEY),
        }
    }

    pub async fn list(&self) -> Result<Vec<Project>> {
        self.projects.load().await
    }

    pub async fn favorites(&self) -> Result<Vec<Project>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|project| project.is_favorite)
            .collect())
    }

    /// Add a project with a trimmed, non-empty name
    pub async fn add(&self, name: &str) -> Result<Project> {
        let name = required_name(name)?;

        let (project, _) = self
            .projects
            .mutate(|all| {
                let project = Project {
                    id: next_id(all)?,
                    name,
                    tasks: Vec::new(),
                    notes: Vec::new(),
                    is_favorite: false,
                };
                all.push(project.clone());
                Ok(project)
            })
            .await?;

        tracing::info!("Added project {} ({})", project.id, project.name);
        Ok(project)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Project> {
        let name = required_name(name)?;
        self.modify(id, |project| project.name = name).await
    }

    pub async fn toggle_favorite(&self, id: i64) -> Result<Project> {
        self.modify(id, |project| project.is_favorite = !project.is_favorite)
            .await
    }

    /// Copy a project under a new id, named `<name> (copy)`, not favorite
    pub async fn duplicate(&self, id: i64) -> Result<Project> {
        let (copy, _) = self
            .projects
            .mutate(|all| {
                let source = all
                    .iter()
                    .find(|project| project.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("project {}", id)))?;

                let copy = Project {
                    id: next_id(all)?,
                    name: format!("{} (copy)", source.name),
                    is_favorite: false,
                    ..source.clone()
                };
                all.push(copy.clone());
                Ok(copy)
            })
            .await?;

        tracing::info!("Duplicated project {} as {}", id, copy.id);
        Ok(copy)
    }

    /// Delete a project; returns whether it existed
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let (removed, _) = self
            .projects
            .mutate(|all| {
                let before = all.len();
                all.retain(|project| project.id != id);
                Ok(all.len() != before)
            })
            .await?;

        if removed {
            tracing::info!("Deleted project {}", id);
        }
        Ok(removed)
    }

    async fn modify<F>(&self, id: i64, change: F) -> Result<Project>
    where
        F: FnOnce(&mut Project),
    {
        let (project, _) = self
            .projects
            .mutate(|all| {
                let project = all
                    .iter_mut()
                    .find(|project| project.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("project {}", id)))?;
                change(project);
                Ok(project.clone())
            })
            .await?;

        Ok(project)
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Project name is required".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlotStore;

    fn create_test_list() -> ProjectList {
        ProjectList::new(Arc::new(MemorySlotStore::new()))
    }

    #[tokio::test]
    async fn test_add_and_rename() {
        let projects = create_test_list();

        let project = projects.add("  Launch  ").await.unwrap();
        assert_eq!(project.name, "Launch");
        assert!(!project.is_favorite);

        let renamed = projects.rename(project.id, "Relaunch").await.unwrap();
        assert_eq!(renamed.name, "Relaunch");

        assert!(matches!(
            projects.rename(project.id, "   ").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(projects.add("").await, Err(AppError::Validation(_))));
        assert_eq!(projects.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_favorites() {
        let projects = create_test_list();
        let home = projects.add("Home").await.unwrap();
        projects.add("Work").await.unwrap();

        projects.toggle_favorite(home.id).await.unwrap();
        let favorites = projects.favorites().await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Home");

        projects.toggle_favorite(home.id).await.unwrap();
        assert!(projects.favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate() {
        let projects = create_test_list();
        let original = projects.add("Garden").await.unwrap();
        projects.toggle_favorite(original.id).await.unwrap();

        let copy = projects.duplicate(original.id).await.unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Garden (copy)");
        assert!(!copy.is_favorite);
        assert_eq!(projects.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_project() {
        let projects = create_test_list();

        assert!(matches!(
            projects.toggle_favorite(99).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            projects.duplicate(99).await,
            Err(AppError::NotFound(_))
        ));
        assert!(!projects.delete(99).await.unwrap());
    }
}
