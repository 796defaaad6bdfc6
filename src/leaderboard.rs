use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{Completion, Staff, Task};

/// Points earned by one staff member over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub staff_id: u64,
    pub name: String,
    pub completions: usize,
    pub points: i64,
}

/// First day of the month containing `today`, the default leaderboard start.
pub fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Sums task points per staff member for completions dated within `[from, to]`.
///
/// Completions referring to deleted tasks or staff are ignored. Sorted by
/// points, then number of completions, then name.
pub fn standings(tasks: &[Task], staff: &[Staff], completions: &[Completion], from: NaiveDate, to: NaiveDate) -> Vec<Standing> {
    let points: HashMap<u64, i64> = tasks.iter().map(|t| (t.id, t.points)).collect();
    let mut by_staff: HashMap<u64, Standing> = HashMap::new();

    for c in completions {
        let day = c.completed_at.date();
        if day < from || day > to {
            continue;
        }
        let Some(task_points) = points.get(&c.task_id) else { continue };
        let Some(member) = staff.iter().find(|s| s.id == c.staff_id) else { continue };
        let entry = by_staff.entry(member.id).or_insert_with(|| Standing {
            staff_id: member.id,
            name: member.name.clone(),
            completions: 0,
            points: 0,
        });
        entry.completions += 1;
        entry.points += task_points;
    }

    let mut rows: Vec<Standing> = by_staff.into_values().collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.completions.cmp(&a.completions))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}
