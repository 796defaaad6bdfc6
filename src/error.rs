use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the store and the command handlers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("task {0} not found")]
    TaskNotFound(u64),
    #[error("staff member {0} not found")]
    StaffNotFound(u64),
    #[error("note {0} not found")]
    NoteNotFound(u64),
    #[error("task {0} is inactive")]
    TaskInactive(u64),
    #[error("staff member {0} is inactive")]
    StaffInactive(u64),
    #[error("task {task_id} was already completed on {date}")]
    AlreadyCompleted { task_id: u64, date: NaiveDate },
    #[error("task {0} has not been completed today")]
    NotCompleted(u64),
    #[error("staff member {0} has completions; deactivate them instead")]
    StaffHasCompletions(u64),
    #[error("{0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;
