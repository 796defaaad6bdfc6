use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Completion, Staff, Task};
use crate::recurrence::{board_order, is_due_today, is_overdue};

/// One row of the kiosk board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub task: Task,
    /// Who completed the task today, if anyone.
    pub completed_by: Option<Staff>,
    pub completed_today: bool,
    /// Set when the deadline passed and nobody completed the task.
    pub overdue: bool,
}

/// Completions whose timestamp falls on `day`.
pub fn completions_on<'a>(completions: &'a [Completion], day: NaiveDate) -> impl Iterator<Item = &'a Completion> {
    completions.iter().filter(move |c| c.completed_at.date() == day)
}

/// Builds today's board: active tasks due on the day of `now`, sorted by
/// deadline then title, each marked with its completion and overdue state.
pub fn build_board(tasks: &[Task], completions: &[Completion], staff: &[Staff], now: NaiveDateTime) -> Vec<BoardEntry> {
    let today = now.date();
    let mut entries: Vec<BoardEntry> = tasks
        .iter()
        .filter(|t| t.active && is_due_today(&t.recurrence, now))
        .map(|t| {
            let completion = completions_on(completions, today).find(|c| c.task_id == t.id);
            let completed_today = completion.is_some();
            BoardEntry {
                completed_by: completion.and_then(|c| staff.iter().find(|s| s.id == c.staff_id).cloned()),
                completed_today,
                overdue: is_overdue(t.due_time.as_deref(), completed_today, now),
                task: t.clone(),
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        board_order(a.task.due_time.as_deref(), &a.task.title, b.task.due_time.as_deref(), &b.task.title)
    });
    entries
}
