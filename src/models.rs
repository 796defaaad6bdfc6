use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::recurrence::{Frequency, Recurrence};

/// Sort position given to tasks that never had one.
pub const DEFAULT_SORT_INDEX: i64 = 1000;

/// A task definition shown on the board when its recurrence says it is due.
///
/// Stored on disk in the flat column shape of [`TaskRow`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "TaskRow", into = "TaskRow")]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// Text shown on the board.
    pub title: String,
    /// Which days the task is due.
    pub recurrence: Recurrence,
    /// Optional deadline as `HH:MM`.
    pub due_time: Option<String>,
    /// Points awarded to whoever completes the task.
    pub points: i64,
    /// Inactive tasks never appear on the board.
    pub active: bool,
    /// Manual ordering in the admin list.
    pub sort_index: i64,
}

/// Column layout of a stored task.
///
/// Missing columns take the defaults the board has always used: active,
/// one point, sort position 1000. A column holding the wrong JSON type reads
/// as missing, so one malformed row cannot hide the rest of the board.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TaskRow {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_weekdays")]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub day_of_month: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub specific_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub due_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub points: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub sort_index: Option<i64>,
}

/// Reads a column, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Reads `days_of_week`, keeping only integer entries. Anything but an array is absent.
fn lenient_weekdays<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.iter().filter_map(Value::as_i64).collect()),
        _ => None,
    })
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let recurrence = Recurrence::from_columns(
            row.frequency.as_deref(),
            row.days_of_week.as_deref(),
            row.day_of_month,
            row.specific_date.as_deref(),
        );
        Task {
            id: row.id,
            title: row.title.unwrap_or_default(),
            recurrence,
            due_time: row.due_time.filter(|t| !t.trim().is_empty()),
            points: row.points.unwrap_or(1),
            active: row.active.unwrap_or(true),
            sort_index: row.sort_index.unwrap_or(DEFAULT_SORT_INDEX),
        }
    }
}

impl From<Task> for TaskRow {
    fn from(task: Task) -> Self {
        let mut row = TaskRow {
            id: task.id,
            title: Some(task.title),
            due_time: task.due_time,
            points: Some(task.points),
            active: Some(task.active),
            sort_index: Some(task.sort_index),
            ..TaskRow::default()
        };
        match task.recurrence {
            Recurrence::Daily => row.frequency = Some(Frequency::Daily.as_str().into()),
            Recurrence::Weekly { days } => {
                row.frequency = Some(Frequency::Weekly.as_str().into());
                row.days_of_week = Some(days.into_iter().map(i64::from).collect());
            }
            Recurrence::Monthly { day } => {
                row.frequency = Some(Frequency::Monthly.as_str().into());
                row.day_of_month = day.map(i64::from);
            }
            Recurrence::SpecificDate { date } => {
                row.frequency = Some(Frequency::SpecificDate.as_str().into());
                row.specific_date = date;
            }
            Recurrence::Unrecognized { raw } => row.frequency = raw,
        }
        row
    }
}

/// A member of staff who can be credited with completions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Staff {
    pub id: u64,
    pub name: String,
    /// Link to a portrait shown on the kiosk.
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Staff {
    /// First letter of the first and last word of the name, upper-cased.
    pub fn initials(&self) -> String {
        let parts: Vec<&str> = self.name.split_whitespace().collect();
        let first = parts.first().and_then(|p| p.chars().next());
        let last = if parts.len() > 1 {
            parts.last().and_then(|p| p.chars().next())
        } else {
            None
        };
        first.into_iter().chain(last).collect::<String>().to_uppercase()
    }
}

/// Record that a staff member finished a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Completion {
    pub id: u64,
    pub task_id: u64,
    pub staff_id: u64,
    /// Local wall-clock time of the completion.
    pub completed_at: NaiveDateTime,
}

/// An entry in the notes feed. Replies point at their thread root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Note {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    pub created_at: NaiveDateTime,
}
