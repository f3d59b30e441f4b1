//! Dashboard
//!
//! Cross-collection search and the upcoming-task reminder monitor.
//! The monitor checks the `tasks` slot on a fixed interval and sends one
//! notification per open task due within the upcoming window.

use super::models::{Note, Task};
use crate::config::{NOTES_KEY, TASKS_KEY, UPCOMING_WINDOW_HOURS};
use crate::error::Result;
use crate::storage::{LocalCollection, SlotStore};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Matches of a dashboard search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
}

/// Notification for a task due soon
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingTask {
    pub task_id: i64,
    pub title: String,
    pub due: DateTime<Utc>,
}

impl UpcomingTask {
    pub fn message(&self) -> String {
        format!("\"{}\" is due in less than 2 days", self.title)
    }
}

/// Read-only view over tasks and notes
#[derive(Clone)]
pub struct Dashboard {
    tasks: LocalCollection<Task>,
    notes: LocalCollection<Note>,
}

impl Dashboard {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            tasks: LocalCollection::new(Arc::clone(&store), TASKS_KEY),
            notes: LocalCollection::new(store, NOTES_KEY),
        }
    }

    /// Search tasks (title, description) and notes (title, content) in a
    /// project scope. A blank query yields `None`.
    pub async fn search(&self, query: &str, project: Option<i64>) -> Result<Option<SearchResults>> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        let query = query.to_lowercase();
        let in_scope = |item_project: Option<i64>| project.map_or(true, |id| item_project == Some(id));

        let tasks = self
            .tasks
            .load()
            .await?
            .into_iter()
            .filter(|task| in_scope(task.project_id))
            .filter(|task| {
                task.title.to_lowercase().contains(&query)
                    || task.description.to_lowercase().contains(&query)
            })
            .collect();

        let notes = self
            .notes
            .load()
            .await?
            .into_iter()
            .filter(|note| in_scope(note.project_id))
            .filter(|note| {
                note.title.to_lowercase().contains(&query)
                    || note.content.to_lowercase().contains(&query)
            })
            .collect();

        Ok(Some(SearchResults { tasks, notes }))
    }

    /// Open tasks due after `now` and no later than the upcoming window
    pub async fn upcoming_tasks(&self, now: DateTime<Utc>) -> Result<Vec<UpcomingTask>> {
        Ok(upcoming(&self.tasks.load().await?, now))
    }

    /// Start the reminder monitor.
    ///
    /// Runs a check immediately and then every `interval`; every hit is
    /// sent again on each check while it stays upcoming. Stops when the
    /// receiver is dropped.
    pub fn start_monitor(
        self,
        interval: std::time::Duration,
    ) -> (JoinHandle<()>, mpsc::Receiver<UpcomingTask>) {
        let (tx, rx) = mpsc::channel(32);

        let handle = tokio::spawn(async move {
            tracing::info!("Starting upcoming-task monitor");

            let mut ticker = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = tx.closed() => break,
                }

                let upcoming = match self.upcoming_tasks(Utc::now()).await {
                    Ok(upcoming) => upcoming,
                    Err(e) => {
                        tracing::error!("Error checking upcoming tasks: {}", e);
                        continue;
                    }
                };

                for task in upcoming {
                    tracing::info!("Task {} is due at {}", task.task_id, task.due);
                    if tx.send(task).await.is_err() {
                        break;
                    }
                }
            }

            tracing::debug!("Upcoming-task receiver dropped, stopping monitor");
        });

        (handle, rx)
    }
}

fn upcoming(tasks: &[Task], now: DateTime<Utc>) -> Vec<UpcomingTask> {
    let horizon = now + Duration::hours(UPCOMING_WINDOW_HOURS);

    tasks
        .iter()
        .filter(|task| !task.status.is_completed())
        .filter_map(|task| {
            let due = task.due_date.instant()?;
            (due > now && due <= horizon).then(|| UpcomingTask {
                task_id: task.id,
                title: task.title.clone(),
                due,
            })
        })
        .collect()
}
