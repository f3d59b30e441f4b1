//! Local workspace models
//!
//! Records kept in the local slots. Field names on the wire are the
//! camelCase names stored by earlier versions of the workspace, so
//! existing slots keep loading.

use crate::config::{DEFAULT_ESTIMATED_TIME, DEFAULT_TASK_ICON, UNSET_SENTINEL};
use crate::storage::Keyed;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Task lifecycle status, in board column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "New task")]
    New,
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::New,
        TaskStatus::Scheduled,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Display label, identical to the stored value
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::New => "New task",
            TaskStatus::Scheduled => "Scheduled",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn is_completed(self) -> bool {
        self == TaskStatus::Completed
    }
}

/// A date-like field as stored in the slots.
///
/// Besides the `"-"` sentinel and UTC instants, older entries hold a bare
/// `HH:MM` start time or a locale-formatted date. A bare time is kept as
/// a time of day; any other unrecognised text is kept verbatim so the
/// rest of the collection still loads and the value round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stamp {
    #[default]
    Unset,
    At(DateTime<Utc>),
    TimeOfDay(NaiveTime),
    Raw(String),
}

impl Stamp {
    pub fn now() -> Self {
        Stamp::At(Utc::now())
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Stamp::Unset)
    }

    /// The instant, when the value carries a full date and time
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Stamp::At(at) => Some(*at),
            Stamp::Unset | Stamp::TimeOfDay(_) | Stamp::Raw(_) => None,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.instant().map(|at| at.date_naive())
    }

    /// Parse a stored value: the sentinel or an empty string, an RFC 3339
    /// instant, a bare `YYYY-MM-DD` / `M/D/YYYY` date (midnight UTC) or a
    /// bare `HH:MM` time. Anything else is kept as raw text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNSET_SENTINEL {
            return Stamp::Unset;
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return Stamp::At(at.with_timezone(&Utc));
        }

        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0));
        if let Some(midnight) = date {
            return Stamp::At(midnight.and_utc());
        }

        if let Ok(time) = NaiveTime::parse_from_str(trimmed, TIME_OF_DAY_FORMAT) {
            return Stamp::TimeOfDay(time);
        }

        tracing::debug!("Keeping unrecognized date value '{}' as text", raw);
        Stamp::Raw(raw.to_string())
    }
}

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

impl Serialize for Stamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Stamp::Unset => serializer.serialize_str(UNSET_SENTINEL),
            Stamp::At(at) => {
                serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Stamp::TimeOfDay(time) => {
                serializer.serialize_str(&time.format(TIME_OF_DAY_FORMAT).to_string())
            }
            Stamp::Raw(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for Stamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Stamp::Unset, Stamp::parse))
    }
}

fn default_estimated_time() -> String {
    DEFAULT_ESTIMATED_TIME.to_string()
}

fn default_icon() -> String {
    DEFAULT_TASK_ICON.to_string()
}

/// A task. `project_id` of `None` means the unscoped workspace.
///
/// `closed_date` is set exactly when the status is Completed; the rule
/// is applied by `TaskBoard` when tasks are created or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-form type label, usually a `TaskType` name
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub creation_date: Stamp,
    #[serde(default)]
    pub closed_date: Stamp,
    #[serde(default)]
    pub due_date: Stamp,
    #[serde(default)]
    pub start_time: Stamp,
    #[serde(default = "default_estimated_time")]
    pub estimated_time: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl Keyed for Task {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A note card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub project_id: Option<i64>,
}

impl Keyed for Note {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A project grouping tasks and notes.
///
/// The embedded arrays are carried along for compatibility and never
/// read; membership is the `project_id` on tasks and notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<serde_json::Value>,
    #[serde(default)]
    pub notes: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Keyed for Project {
    fn id(&self) -> i64 {
        self.id
    }
}

/// A task type offered in the task and/or event dropdowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskType {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(rename = "tasks")]
    pub for_tasks: bool,
    #[serde(rename = "events")]
    pub for_events: bool,
}

impl Keyed for TaskType {
    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_stamp_sentinel() {
        assert_eq!(Stamp::parse("-"), Stamp::Unset);
        assert_eq!(Stamp::parse(""), Stamp::Unset);
        assert_eq!(serde_json::to_value(Stamp::Unset).unwrap(), json!("-"));
    }

    #[test]
    fn test_stamp_formats() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();

        assert_eq!(
            serde_json::to_value(Stamp::At(at)).unwrap(),
            json!("2024-03-09T14:30:00.000Z")
        );
        assert_eq!(Stamp::parse("2024-03-09T14:30:00.000Z"), Stamp::At(at));
        assert_eq!(
            Stamp::parse("2024-03-09").date(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
        assert_eq!(
            Stamp::parse("3/9/2024").date(),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
    }

    #[test]
    fn test_stamp_keeps_time_of_day_and_unknown_text() {
        let time = Stamp::parse("14:30");
        assert_eq!(time, Stamp::TimeOfDay(NaiveTime::from_hms_opt(14, 30, 0).unwrap()));
        assert_eq!(time.instant(), None);
        assert_eq!(serde_json::to_value(&time).unwrap(), json!("14:30"));

        let localized = Stamp::parse("19/10/2026");
        assert_eq!(localized, Stamp::Raw("19/10/2026".to_string()));
        assert!(localized.is_set());
        assert_eq!(localized.date(), None);
        assert_eq!(serde_json::to_value(&localized).unwrap(), json!("19/10/2026"));
    }

    #[test]
    fn test_task_with_legacy_stamps_loads() {
        let stored = json!({
            "id": 1700000000001i64,
            "title": "Board meeting",
            "description": "",
            "status": "Completed",
            "type": "Meeting",
            "color": "bg-orange-100",
            "creationDate": "2026-10-01T08:00:00.000Z",
            "closedDate": "19/10/2026",
            "dueDate": "2026-10-19T00:00:00.000Z",
            "startTime": "14:30",
            "estimatedTime": "1h",
            "icon": "📝",
            "projectId": 4
        });

        let task: Task = serde_json::from_value(stored.clone()).unwrap();

        assert!(task.closed_date.is_set());
        assert!(matches!(task.start_time, Stamp::TimeOfDay(_)));
        assert_eq!(serde_json::to_value(&task).unwrap(), stored);
    }

    #[test]
    fn test_task_reads_stored_shape() {
        let stored = json!({
            "id": 1700000000000i64,
            "title": "Write report",
            "description": "",
            "status": "In Progress",
            "type": "Technical",
            "color": "bg-sky-100",
            "creationDate": "2024-03-09T10:00:00.000Z",
            "closedDate": "-",
            "dueDate": "2024-03-10T00:00:00.000Z",
            "startTime": "-",
            "estimatedTime": "2h",
            "icon": "📝",
            "projectId": null
        });

        let task: Task = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.task_type, "Technical");
        assert_eq!(task.closed_date, Stamp::Unset);
        assert_eq!(task.project_id, None);
        assert_eq!(serde_json::to_value(&task).unwrap(), stored);
    }

    #[test]
    fn test_task_type_flags() {
        let stored = json!({"id": 6, "name": "Meeting", "color": "bg-orange-100", "tasks": false, "events": true});

        let task_type: TaskType = serde_json::from_value(stored).unwrap();

        assert!(!task_type.for_tasks);
        assert!(task_type.for_events);
    }

    #[test]
    fn test_status_labels_match_wire() {
        for status in TaskStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.label()));
        }
    }
}
