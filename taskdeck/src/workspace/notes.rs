//! Notes board
//!
//! Note cards for one project scope, persisted in the `notes` slot.

use super::models::Note;
use crate::config::{DEFAULT_NOTE_COLOR, NOTES_KEY};
use crate::error::{AppError, Result};
use crate::storage::{next_id, LocalCollection, SlotStore, SlotWatcher};
use std::sync::Arc;
use std::time::Duration;

/// Note operations scoped to a project (`None` shows every note)
pub struct NoteBoard {
    notes: LocalCollection<Note>,
    project: Option<i64>,
    snapshot: Vec<Note>,
}

impl NoteBoard {
    pub fn new(store: Arc<dyn SlotStore>, project: Option<i64>) -> Self {
        Self {
            notes: LocalCollection::new(store, NOTES_KEY),
            project,
            snapshot: Vec::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.snapshot
    }

    pub async fn load(&mut self) -> Result<&[Note]> {
        let all = self.notes.load().await?;
        self.apply_snapshot(all);
        Ok(&self.snapshot)
    }

    pub fn apply_snapshot(&mut self, all: Vec<Note>) {
        let project = self.project;
        self.snapshot = all
            .into_iter()
            .filter(|note| project.map_or(true, |id| note.project_id == Some(id)))
            .collect();
    }

    pub async fn watch(&self, poll_interval: Duration) -> Result<SlotWatcher<Note>> {
        SlotWatcher::spawn(self.notes.clone(), poll_interval).await
    }

    /// Create a note; title and content must not be blank
    pub async fn create(
        &mut self,
        title: &str,
        content: &str,
        color: Option<&str>,
    ) -> Result<Note> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(AppError::Validation(
                "Note title and content are required".to_string(),
            ));
        }

        let project = self.project;
        let (note, all) = self
            .notes
            .mutate(|all| {
                let note = Note {
                    id: next_id(all)?,
                    title: title.to_string(),
                    content: content.to_string(),
                    color: color.unwrap_or(DEFAULT_NOTE_COLOR).to_string(),
                    project_id: project,
                };
                all.push(note.clone());
                Ok(note)
            })
            .await?;

        tracing::info!("Created note {}", note.id);
        self.apply_snapshot(all);
        Ok(note)
    }

    /// Delete a note; returns whether it existed
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let (removed, all) = self
            .notes
            .mutate(|all| {
                let before = all.len();
                all.retain(|note| note.id != id);
                Ok(all.len() != before)
            })
            .await?;

        if removed {
            tracing::info!("Deleted note {}", id);
        }
        self.apply_snapshot(all);
        Ok(removed)
    }

    /// Notes whose title or content contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<Note> {
        let query = query.to_lowercase();
        self.snapshot
            .iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&query)
                    || note.content.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }
}
