use crate::models::Task;
use crate::recurrence::{Frequency, Recurrence};

const DOW: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Frequency filter of the admin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyFilter {
    All,
    Only(Frequency),
    /// Tasks whose frequency is missing or unrecognised.
    Unset,
}

impl FrequencyFilter {
    pub fn parse(s: &str) -> Option<FrequencyFilter> {
        match s {
            "all" => Some(FrequencyFilter::All),
            "none" => Some(FrequencyFilter::Unset),
            other => Frequency::parse(other).map(FrequencyFilter::Only),
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            FrequencyFilter::All => true,
            FrequencyFilter::Only(f) => task.recurrence.frequency() == Some(*f),
            FrequencyFilter::Unset => task.recurrence.frequency().is_none(),
        }
    }
}

/// Active-flag filter of the admin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<StatusFilter> {
        match s {
            "all" => Some(StatusFilter::All),
            "active" => Some(StatusFilter::Active),
            "inactive" => Some(StatusFilter::Inactive),
            _ => None,
        }
    }
}

/// Search and filter settings for the admin task list.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub frequency: FrequencyFilter,
    pub status: StatusFilter,
}

impl Default for TaskFilter {
    fn default() -> Self {
        TaskFilter { search: None, frequency: FrequencyFilter::All, status: StatusFilter::All }
    }
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let ok_search = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => task.title.to_lowercase().contains(&q.to_lowercase()),
            _ => true,
        };
        let ok_status = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => task.active,
            StatusFilter::Inactive => !task.active,
        };
        ok_search && ok_status && self.frequency.matches(task)
    }
}

/// Sorts tasks the way the admin list shows them: sort index, then title.
pub fn admin_order(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| a.sort_index.cmp(&b.sort_index).then_with(|| a.title.cmp(&b.title)));
}

/// Applies the filter and returns the matching tasks in admin order.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    admin_order(&mut out);
    out
}

pub fn frequency_label(recurrence: &Recurrence) -> &'static str {
    recurrence.frequency().map(|f| f.label()).unwrap_or("-")
}

/// Human readable selector: weekdays, day of month or date.
pub fn frequency_detail(recurrence: &Recurrence) -> String {
    match recurrence {
        Recurrence::Weekly { days } if !days.is_empty() => days
            .iter()
            .map(|d| DOW.get(*d as usize).copied().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", "),
        Recurrence::Monthly { day: Some(d) } => format!("Day {}", d),
        Recurrence::SpecificDate { date: Some(d) } => d.clone(),
        _ => "-".to_string(),
    }
}

/// Shows `HH:MM` for a stored `HH:MM[:SS]`, or `-`.
pub fn time_label(due_time: Option<&str>) -> String {
    match due_time {
        Some(t) => {
            let parts: Vec<&str> = t.split(':').collect();
            if parts.len() >= 2 {
                format!("{}:{}", parts[0], parts[1])
            } else {
                t.to_string()
            }
        }
        None => "-".to_string(),
    }
}

/// Reassigns sort indices so `id` lands at the 1-based `position`.
///
/// Indices are renumbered 10, 20, 30, ... in admin order. Returns false when
/// `id` is not in the list.
pub fn move_to(tasks: &mut Vec<Task>, id: u64, position: usize) -> bool {
    admin_order(tasks);
    let Some(from) = tasks.iter().position(|t| t.id == id) else {
        return false;
    };
    let task = tasks.remove(from);
    let to = position.saturating_sub(1).min(tasks.len());
    tasks.insert(to, task);
    for (i, t) in tasks.iter_mut().enumerate() {
        t.sort_index = (i as i64 + 1) * 10;
    }
    true
}
