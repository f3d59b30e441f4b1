//! Local workspace
//!
//! Tasks, notes, projects and task types kept in named storage slots.
//! Every handle reads the whole collection, changes it and writes it
//! back; views stay fresh through `SlotWatcher`.

pub mod dashboard;
pub mod models;
pub mod notes;
pub mod projects;
pub mod task_types;
pub mod tasks;

pub use dashboard::{Dashboard, SearchResults, UpcomingTask};
pub use models::{Note, Project, Stamp, Task, TaskStatus, TaskType};
pub use notes::NoteBoard;
pub use projects::ProjectList;
pub use task_types::{default_types, TaskTypeRegistry, TypeScope};
pub use tasks::{CalendarDay, CalendarMonth, KanbanColumn, NewTask, TaskBoard, TaskTable};

use crate::config::{POLL_INTERVAL, UPCOMING_CHECK_INTERVAL};
use crate::error::Result;
use crate::storage::{FileSlotStore, MemorySlotStore, SlotStore, SlotWatcher};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Entry point handing out collection handles over one slot store
#[derive(Clone)]
pub struct Workspace {
    store: Arc<dyn SlotStore>,
}

impl Workspace {
    /// Open a workspace stored as JSON files under `dir`
    pub async fn open(dir: PathBuf) -> Result<Self> {
        let store = FileSlotStore::new(dir);
        store.initialize().await?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Workspace that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemorySlotStore::new()))
    }

    pub fn with_store(store: Arc<dyn SlotStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SlotStore> {
        &self.store
    }

    /// Task board for a project, or for every task when `None`
    pub fn tasks(&self, project: Option<i64>) -> TaskBoard {
        TaskBoard::new(Arc::clone(&self.store), project)
    }

    /// Notes board for a project, or for every note when `None`
    pub fn notes(&self, project: Option<i64>) -> NoteBoard {
        NoteBoard::new(Arc::clone(&self.store), project)
    }

    pub fn projects(&self) -> ProjectList {
        ProjectList::new(Arc::clone(&self.store))
    }

    pub fn task_types(&self) -> TaskTypeRegistry {
        TaskTypeRegistry::new(Arc::clone(&self.store))
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::new(Arc::clone(&self.store))
    }

    /// Watch every task at the standard poll interval
    pub async fn watch_tasks(&self) -> Result<SlotWatcher<Task>> {
        self.tasks(None).watch(POLL_INTERVAL).await
    }

    /// Watch every note at the standard poll interval
    pub async fn watch_notes(&self) -> Result<SlotWatcher<Note>> {
        self.notes(None).watch(POLL_INTERVAL).await
    }

    /// Start the upcoming-task reminder monitor at the standard interval
    pub fn start_reminders(&self) -> (JoinHandle<()>, mpsc::Receiver<UpcomingTask>) {
        self.dashboard().start_monitor(UPCOMING_CHECK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_workspace_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();

        let workspace = Workspace::open(temp_dir.path().to_path_buf()).await.unwrap();
        let project = workspace.projects().add("Home").await.unwrap();
        workspace
            .notes(Some(project.id))
            .create("Plumber", "call on Monday", None)
            .await
            .unwrap();

        let reopened = Workspace::open(temp_dir.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.projects().list().await.unwrap(), vec![project.clone()]);

        let mut notes = reopened.notes(Some(project.id));
        assert_eq!(notes.load().await.unwrap().len(), 1);
        assert!(temp_dir.path().join("notes.json").exists());
    }

    #[tokio::test]
    async fn test_handles_share_the_store() {
        let workspace = Workspace::in_memory();

        workspace.projects().add("Work").await.unwrap();

        assert_eq!(workspace.projects().list().await.unwrap().len(), 1);
        assert_eq!(workspace.task_types().load().await.unwrap(), default_types());
    }

    #[tokio::test]
    async fn test_watcher_sees_new_notes() {
        let workspace = Workspace::in_memory();
        let mut watcher = workspace.watch_notes().await.unwrap();
        assert!(watcher.current().is_empty());

        workspace
            .notes(None)
            .create("Errands", "post office", None)
            .await
            .unwrap();

        let notes = tokio::time::timeout(std::time::Duration::from_secs(5), watcher.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(notes.len(), 1);
    }
}
