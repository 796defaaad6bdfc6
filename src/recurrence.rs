use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Sentinel returned by [`minutes_since_midnight`] for a task without a deadline.
///
/// Larger than any real time of day, so deadline-free tasks sort last.
pub const NO_DEADLINE: u32 = u32::MAX;

/// Which calendar days a task is due on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    /// Due every day.
    Daily,
    /// Due on the listed days of the week (0 = Sunday .. 6 = Saturday).
    Weekly { days: BTreeSet<u8> },
    /// Due on one day number of each month. Months without that day are skipped.
    Monthly { day: Option<u32> },
    /// Due on a single date, stored as `YYYY-MM-DD`.
    SpecificDate { date: Option<String> },
    /// Frequency missing or not recognised. Treated as due every day.
    Unrecognized { raw: Option<String> },
}

/// The frequency column of a task, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    SpecificDate,
}

impl Frequency {
    /// Parses a stored frequency value. `few_days_per_week` is the old name for `weekly`.
    pub fn parse(s: &str) -> Option<Frequency> {
        match s {
            "daily" => Some(Frequency::Daily),
            "weekly" | "few_days_per_week" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "specific_date" => Some(Frequency::SpecificDate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::SpecificDate => "specific_date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::SpecificDate => "Specific date",
        }
    }
}

impl Recurrence {
    /// Builds a recurrence from the flat column shape of a stored task.
    ///
    /// Only the column selected by `frequency` is read. Out-of-range weekdays and
    /// days of month are dropped, and a date that is not canonical `YYYY-MM-DD` is
    /// kept as-is so it simply never matches.
    pub fn from_columns(
        frequency: Option<&str>,
        days_of_week: Option<&[i64]>,
        day_of_month: Option<i64>,
        specific_date: Option<&str>,
    ) -> Recurrence {
        match frequency.and_then(Frequency::parse) {
            Some(Frequency::Daily) => Recurrence::Daily,
            Some(Frequency::Weekly) => Recurrence::Weekly {
                days: days_of_week
                    .unwrap_or_default()
                    .iter()
                    .filter(|d| (0..=6).contains(*d))
                    .map(|d| *d as u8)
                    .collect(),
            },
            Some(Frequency::Monthly) => Recurrence::Monthly {
                day: day_of_month
                    .filter(|d| (1..=31).contains(d))
                    .map(|d| d as u32),
            },
            Some(Frequency::SpecificDate) => Recurrence::SpecificDate {
                date: specific_date.map(str::to_string),
            },
            None => Recurrence::Unrecognized {
                raw: frequency.map(str::to_string),
            },
        }
    }

    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            Recurrence::Daily => Some(Frequency::Daily),
            Recurrence::Weekly { .. } => Some(Frequency::Weekly),
            Recurrence::Monthly { .. } => Some(Frequency::Monthly),
            Recurrence::SpecificDate { .. } => Some(Frequency::SpecificDate),
            Recurrence::Unrecognized { .. } => None,
        }
    }
}

/// Day of the week as 0 (Sunday) through 6 (Saturday).
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Returns whether a task with this recurrence is due on the calendar day of `at`.
///
/// Known frequencies with a missing selector are never due. An unknown or missing
/// frequency is always due, so a malformed task stays visible on the board.
pub fn is_due_today(recurrence: &Recurrence, at: NaiveDateTime) -> bool {
    let today = at.date();
    match recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly { days } => days.contains(&weekday_index(today)),
        Recurrence::Monthly { day } => *day == Some(today.day()),
        Recurrence::SpecificDate { date } => date
            .as_deref()
            .is_some_and(|d| d == today.format("%Y-%m-%d").to_string()),
        Recurrence::Unrecognized { .. } => true,
    }
}

/// Parses `HH:MM` or `HH:MM:SS` into minutes past midnight.
///
/// Missing, empty or malformed input yields [`NO_DEADLINE`].
pub fn minutes_since_midnight(time: Option<&str>) -> u32 {
    let Some(s) = time.map(str::trim).filter(|s| !s.is_empty()) else {
        return NO_DEADLINE;
    };
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map(|t| t.hour() * 60 + t.minute())
        .unwrap_or(NO_DEADLINE)
}

/// Minutes past midnight of the wall-clock time in `at`.
pub fn minutes_of(at: NaiveDateTime) -> u32 {
    at.hour() * 60 + at.minute()
}

/// Returns whether a task's deadline has passed at `at`.
///
/// Only the clock time is compared: a task due at 23:59 becomes overdue after
/// 23:59 and is judged afresh the next day. Completed tasks are never overdue.
pub fn is_overdue(due_time: Option<&str>, completed_today: bool, at: NaiveDateTime) -> bool {
    if completed_today {
        return false;
    }
    let due = minutes_since_midnight(due_time);
    if due == NO_DEADLINE {
        return false;
    }
    due < minutes_of(at)
}

/// Board ordering: earliest deadline first, no deadline last, then by title.
pub fn board_order(a_due: Option<&str>, a_title: &str, b_due: Option<&str>, b_title: &str) -> Ordering {
    minutes_since_midnight(a_due)
        .cmp(&minutes_since_midnight(b_due))
        .then_with(|| a_title.cmp(b_title))
}
