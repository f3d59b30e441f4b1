//! Task board
//!
//! Task operations for one project scope, plus the table, kanban and
//! calendar projections the views render. Mutations go through the
//! `tasks` slot; the board's own snapshot is updated immediately.

use super::models::{Stamp, Task, TaskStatus, TaskType};
use crate::config::{DEFAULT_ESTIMATED_TIME, DEFAULT_TASK_ICON, TASKS_KEY};
use crate::error::{AppError, Result};
use crate::storage::{next_id, LocalCollection, SlotStore, SlotWatcher};
use chrono::{Datelike, NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;

/// Input for a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub task_type: TaskType,
    pub due_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub estimated_time: Option<String>,
}

/// Table view: open tasks first, completed tasks in their own section
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTable {
    pub active: Vec<Task>,
    pub completed: Vec<Task>,
}

/// One kanban column
#[derive(Debug, Clone, PartialEq)]
pub struct KanbanColumn {
    pub id: &'static str,
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// One day cell of a calendar month
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub tasks: Vec<Task>,
}

/// Calendar month grid, weeks starting on Sunday
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

/// Task operations scoped to a project (`None` shows every task)
pub struct TaskBoard {
    tasks: LocalCollection<Task>,
    project: Option<i64>,
    snapshot: Vec<Task>,
}

impl TaskBoard {
    pub fn new(store: Arc<dyn SlotStore>, project: Option<i64>) -> Self {
        Self {
            tasks: LocalCollection::new(store, TASKS_KEY),
            project,
            snapshot: Vec::new(),
        }
    }

    pub fn project(&self) -> Option<i64> {
        self.project
    }

    /// Tasks currently shown by this board
    pub fn tasks(&self) -> &[Task] {
        &self.snapshot
    }

    /// Re-read the slot
    pub async fn load(&mut self) -> Result<&[Task]> {
        let all = self.tasks.load().await?;
        self.apply_snapshot(all);
        Ok(&self.snapshot)
    }

    /// Replace the board's snapshot with a full collection, e.g. one
    /// delivered by a watcher
    pub fn apply_snapshot(&mut self, all: Vec<Task>) {
        let project = self.project;
        self.snapshot = all
            .into_iter()
            .filter(|task| in_scope(task, project))
            .collect();
    }

    /// Watch the `tasks` slot
    pub async fn watch(&self, poll_interval: Duration) -> Result<SlotWatcher<Task>> {
        SlotWatcher::spawn(self.tasks.clone(), poll_interval).await
    }

    /// Create a task in this board's project
    pub async fn create(&mut self, new: NewTask) -> Result<Task> {
        let project = self.project;

        let (task, all) = self
            .tasks
            .mutate(|all| {
                let task = build_task(next_id(all)?, new, project);
                all.push(task.clone());
                Ok(task)
            })
            .await?;

        tracing::info!("Created task {} ({})", task.id, task.title);
        self.apply_snapshot(all);
        Ok(task)
    }

    /// Replace a task, applying the closed-date rule against its stored status
    pub async fn update(&mut self, mut task: Task) -> Result<Task> {
        let (task, all) = self
            .tasks
            .mutate(|all| {
                let stored = all
                    .iter_mut()
                    .find(|t| t.id == task.id)
                    .ok_or_else(|| AppError::NotFound(format!("task {}", task.id)))?;

                apply_closed_rule(&mut task, stored.status);
                *stored = task.clone();
                Ok(task)
            })
            .await?;

        tracing::debug!("Updated task {}", task.id);
        self.apply_snapshot(all);
        Ok(task)
    }

    /// Delete a task; returns whether it existed
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let (removed, all) = self
            .tasks
            .mutate(|all| {
                let before = all.len();
                all.retain(|t| t.id != id);
                Ok(all.len() != before)
            })
            .await?;

        if removed {
            tracing::info!("Deleted task {}", id);
        }
        self.apply_snapshot(all);
        Ok(removed)
    }

    /// Tasks whose title, type or description contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<Task> {
        let query = query.to_lowercase();
        self.snapshot
            .iter()
            .filter(|task| matches_query(task, &query))
            .cloned()
            .collect()
    }

    /// Table projection of the tasks matching `query`
    pub fn table(&self, query: &str) -> TaskTable {
        let (completed, active): (Vec<Task>, Vec<Task>) = self
            .search(query)
            .into_iter()
            .partition(|task| task.status.is_completed());

        TaskTable { active, completed }
    }

    /// Kanban projection of the tasks matching `query`, one column per status
    pub fn kanban(&self, query: &str) -> Vec<KanbanColumn> {
        let matching = self.search(query);

        TaskStatus::ALL
            .iter()
            .map(|&status| KanbanColumn {
                id: column_id(status),
                status,
                tasks: matching
                    .iter()
                    .filter(|task| task.status == status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Tasks due on `date`
    pub fn due_on(&self, date: NaiveDate) -> Vec<Task> {
        self.snapshot
            .iter()
            .filter(|task| task.due_date.date() == Some(date))
            .cloned()
            .collect()
    }

    /// Calendar grid for a month; `None` for an invalid year/month
    pub fn month(&self, year: i32, month: u32) -> Option<CalendarMonth> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let days_in_month = next_first.signed_duration_since(first).num_days() as u32;

        let days = (1..=days_in_month)
            .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .map(|date| CalendarDay {
                day: date.day(),
                tasks: self.due_on(date),
            })
            .collect();

        Some(CalendarMonth {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            days,
        })
    }
}

fn in_scope(task: &Task, project: Option<i64>) -> bool {
    project.map_or(true, |id| task.project_id == Some(id))
}

fn matches_query(task: &Task, query_lower: &str) -> bool {
    task.title.to_lowercase().contains(query_lower)
        || task.task_type.to_lowercase().contains(query_lower)
        || task.description.to_lowercase().contains(query_lower)
}

fn column_id(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::New => "new",
        TaskStatus::Scheduled => "scheduled",
        TaskStatus::InProgress => "progress",
        TaskStatus::Completed => "completed",
    }
}

fn build_task(id: i64, new: NewTask, project: Option<i64>) -> Task {
    let now = Stamp::now();

    let due_date = new
        .due_date
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| Stamp::At(at.and_utc()))
        .unwrap_or_default();

    // A start time is only meaningful on a due date
    let start_time = match (new.due_date, new.start_time) {
        (Some(date), Some(time)) => Stamp::At(date.and_time(time).and_utc()),
        _ => Stamp::Unset,
    };

    let estimated_time = new
        .estimated_time
        .filter(|estimate| !estimate.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ESTIMATED_TIME.to_string());

    Task {
        id,
        title: new.title,
        description: new.description,
        status: new.status,
        task_type: new.task_type.name,
        color: new.task_type.color,
        creation_date: now.clone(),
        closed_date: if new.status.is_completed() {
            now
        } else {
            Stamp::Unset
        },
        due_date,
        start_time,
        estimated_time,
        icon: DEFAULT_TASK_ICON.to_string(),
        project_id: project,
    }
}

/// Closed date becomes now when a task enters Completed, is cleared when
/// it is not Completed, and is kept while it stays Completed.
fn apply_closed_rule(task: &mut Task, previous: TaskStatus) {
    if !task.status.is_completed() {
        task.closed_date = Stamp::Unset;
    } else if !previous.is_completed() {
        task.closed_date = Stamp::now();
    }
}
