use std::collections::BTreeSet;
use std::io::{self, Write};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{info, warn};

use crate::admin::{filter_tasks, frequency_detail, frequency_label, move_to, time_label, TaskFilter};
use crate::board::{build_board, completions_on, BoardEntry};
use crate::error::{Error, Result};
use crate::leaderboard::{standings, Standing};
use crate::models::{Completion, Note, Staff, Task, DEFAULT_SORT_INDEX};
use crate::recurrence::{Frequency, Recurrence};
use crate::storage::{next_id, Store};

/// Current local wall-clock time. The host clock is assumed to be set to the venue's zone.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::Invalid(format!("invalid date '{}': {}. Use YYYY-MM-DD.", s, e)))
}

/// Parses a `YYYY-MM-DD HH:MM` reference time.
pub fn parse_at(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| Error::Invalid(format!("invalid time '{}': {}. Use YYYY-MM-DD HH:MM.", s, e)))
}

/// Validates a deadline given as `HH:MM` or `HH:MM:SS` and normalises it to `HH:MM`.
pub fn normalize_due_time(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|e| Error::Invalid(format!("invalid due time '{}': {}. Use HH:MM.", s, e)))
}

fn parse_frequency(s: &str) -> Result<Frequency> {
    Frequency::parse(s.trim()).ok_or_else(|| {
        Error::Invalid(format!(
            "unknown frequency '{}'. Supported: daily, weekly, monthly, specific_date.",
            s
        ))
    })
}

/// Fields of a task as entered in the admin form. `None` leaves a field unchanged on edit.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub title: Option<String>,
    pub frequency: Option<String>,
    pub days: Option<Vec<i64>>,
    pub day: Option<i64>,
    pub date: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub points: Option<i64>,
    pub active: Option<bool>,
}

/// Builds a validated recurrence, falling back to the selector of `current` when
/// it has the same frequency.
fn build_recurrence(freq: Frequency, input: &TaskInput, current: Option<&Recurrence>) -> Result<Recurrence> {
    match freq {
        Frequency::Daily => Ok(Recurrence::Daily),
        Frequency::Weekly => {
            let days: BTreeSet<u8> = match (&input.days, current) {
                (Some(days), _) => {
                    if let Some(bad) = days.iter().find(|d| !(0..=6).contains(*d)) {
                        return Err(Error::Invalid(format!("weekday {} out of range 0-6 (0 = Sunday)", bad)));
                    }
                    days.iter().map(|d| *d as u8).collect()
                }
                (None, Some(Recurrence::Weekly { days })) => days.clone(),
                _ => BTreeSet::new(),
            };
            if days.is_empty() {
                return Err(Error::Invalid("weekly tasks need at least one day (--days)".into()));
            }
            Ok(Recurrence::Weekly { days })
        }
        Frequency::Monthly => {
            let day = match (input.day, current) {
                (Some(d), _) => Some(d),
                (None, Some(Recurrence::Monthly { day })) => day.map(i64::from),
                _ => None,
            };
            match day {
                Some(d) if (1..=31).contains(&d) => Ok(Recurrence::Monthly { day: Some(d as u32) }),
                Some(d) => Err(Error::Invalid(format!("day of month {} out of range 1-31", d))),
                None => Err(Error::Invalid("monthly tasks need a day of month (--day)".into())),
            }
        }
        Frequency::SpecificDate => {
            let date = match (&input.date, current) {
                (Some(d), _) => Some(d.clone()),
                (None, Some(Recurrence::SpecificDate { date })) => date.clone(),
                _ => None,
            };
            let Some(date) = date else {
                return Err(Error::Invalid("specific_date tasks need a date (--date)".into()));
            };
            let parsed = parse_date(&date)?;
            Ok(Recurrence::SpecificDate { date: Some(parsed.format("%Y-%m-%d").to_string()) })
        }
    }
}

fn require_text(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Invalid(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

/// Adds a new task definition and returns its id.
pub fn cmd_task_add(store: &Store, input: TaskInput, silent: bool) -> Result<u64> {
    let title = require_text(input.title.as_deref().unwrap_or_default(), "title")?;
    let freq = parse_frequency(input.frequency.as_deref().unwrap_or_default())?;
    let recurrence = build_recurrence(freq, &input, None)?;
    let due_time = input.due.as_deref().map(normalize_due_time).transpose()?;

    let mut tasks = store.load_tasks()?;
    let id = next_id(&tasks);
    let sort_index = tasks
        .iter()
        .map(|t| t.sort_index)
        .max()
        .map(|m| m + 1)
        .unwrap_or(DEFAULT_SORT_INDEX);
    tasks.push(Task {
        id,
        title,
        recurrence,
        due_time,
        points: input.points.unwrap_or(1),
        active: input.active.unwrap_or(true),
        sort_index,
    });
    store.save_tasks(&tasks)?;
    info!(task_id = id, "task added");
    if !silent { println!("Task added (id = {})", id); }
    Ok(id)
}

/// Edits an existing task. Changing the frequency clears the selectors of the old one.
pub fn cmd_task_edit(store: &Store, id: u64, input: TaskInput, silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let task = tasks.iter_mut().find(|t| t.id == id).ok_or(Error::TaskNotFound(id))?;

    if let Some(title) = &input.title {
        task.title = require_text(title, "title")?;
    }
    let freq = match &input.frequency {
        Some(f) => Some(parse_frequency(f)?),
        None if input.days.is_some() || input.day.is_some() || input.date.is_some() => {
            Some(task.recurrence.frequency().ok_or_else(|| {
                Error::Invalid(format!("task {} has no frequency; set one with --frequency", id))
            })?)
        }
        None => None,
    };
    if let Some(freq) = freq {
        task.recurrence = build_recurrence(freq, &input, Some(&task.recurrence))?;
    }
    if input.clear_due {
        task.due_time = None;
    } else if let Some(due) = &input.due {
        task.due_time = Some(normalize_due_time(due)?);
    }
    if let Some(points) = input.points { task.points = points; }
    if let Some(active) = input.active { task.active = active; }

    store.save_tasks(&tasks)?;
    info!(task_id = id, "task updated");
    if !silent { println!("Task {} updated.", id); }
    Ok(())
}

/// Removes a task together with its completions.
pub fn cmd_task_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let len_before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == len_before {
        return Err(Error::TaskNotFound(id));
    }
    store.save_tasks(&tasks)?;

    let mut completions = store.load_completions()?;
    let before = completions.len();
    completions.retain(|c| c.task_id != id);
    if completions.len() != before {
        store.save_completions(&completions)?;
    }
    info!(task_id = id, removed_completions = before - completions.len(), "task removed");
    if !silent { println!("Task {} removed.", id); }
    Ok(())
}

/// Moves a task to a 1-based position in the admin list.
pub fn cmd_task_move(store: &Store, id: u64, position: usize, silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    if !move_to(&mut tasks, id, position) {
        return Err(Error::TaskNotFound(id));
    }
    store.save_tasks(&tasks)?;
    info!(task_id = id, position, "task moved");
    if !silent { println!("Task {} moved to position {}.", id, position); }
    Ok(())
}

/// Sets the points of several tasks at once. Nothing is written if any id is unknown.
pub fn cmd_task_points(store: &Store, points: i64, ids: &[u64], silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    if let Some(missing) = ids.iter().find(|id| !tasks.iter().any(|t| t.id == **id)) {
        return Err(Error::TaskNotFound(*missing));
    }
    for t in tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
        t.points = points;
    }
    store.save_tasks(&tasks)?;
    info!(count = ids.len(), points, "bulk points update");
    if !silent { println!("Updated points to {} on {} task(s).", points, ids.len()); }
    Ok(())
}

/// Lists task definitions for the admin screen.
pub fn cmd_task_list(store: &Store, filter: &TaskFilter) -> Result<()> {
    let tasks = filter_tasks(&store.load_tasks()?, filter);
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Frequency").add_attribute(Attribute::Bold),
            Cell::new("Days / Date").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Points").add_attribute(Attribute::Bold),
            Cell::new("Active").add_attribute(Attribute::Bold),
        ]);

    for (i, t) in tasks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(t.id),
            Cell::new(&t.title),
            Cell::new(frequency_label(&t.recurrence)).fg(Color::Blue),
            Cell::new(frequency_detail(&t.recurrence)),
            Cell::new(time_label(t.due_time.as_deref())),
            Cell::new(t.points).fg(Color::Yellow),
            if t.active { Cell::new("Active").fg(Color::Green) } else { Cell::new("Inactive").fg(Color::Grey) },
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Adds a staff member and returns their id.
pub fn cmd_staff_add(store: &Store, name: String, photo_url: Option<String>, silent: bool) -> Result<u64> {
    let name = require_text(&name, "name")?;
    let mut staff = store.load_staff()?;
    let id = next_id(&staff);
    staff.push(Staff { id, name, photo_url, active: true });
    store.save_staff(&staff)?;
    info!(staff_id = id, "staff added");
    if !silent { println!("Staff added (id = {})", id); }
    Ok(id)
}

pub fn cmd_staff_edit(store: &Store, id: u64, name: Option<String>, photo_url: Option<String>, active: Option<bool>, silent: bool) -> Result<()> {
    let mut staff = store.load_staff()?;
    let member = staff.iter_mut().find(|s| s.id == id).ok_or(Error::StaffNotFound(id))?;
    if let Some(n) = name { member.name = require_text(&n, "name")?; }
    if let Some(p) = photo_url { member.photo_url = Some(p).filter(|p| !p.trim().is_empty()); }
    if let Some(a) = active { member.active = a; }
    store.save_staff(&staff)?;
    info!(staff_id = id, "staff updated");
    if !silent { println!("Staff {} updated.", id); }
    Ok(())
}

/// Removes a staff member. Members with completions must be deactivated instead.
pub fn cmd_staff_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    if store.load_completions()?.iter().any(|c| c.staff_id == id) {
        warn!(staff_id = id, "refusing to remove staff with completions");
        return Err(Error::StaffHasCompletions(id));
    }
    let mut staff = store.load_staff()?;
    let len_before = staff.len();
    staff.retain(|s| s.id != id);
    if staff.len() == len_before {
        return Err(Error::StaffNotFound(id));
    }
    store.save_staff(&staff)?;
    info!(staff_id = id, "staff removed");
    if !silent { println!("Staff {} removed.", id); }
    Ok(())
}

/// Staff in name order.
pub fn staff_by_name(store: &Store) -> Result<Vec<Staff>> {
    let mut staff = store.load_staff()?;
    staff.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(staff)
}

pub fn cmd_staff_list(store: &Store) -> Result<()> {
    let staff = staff_by_name(store)?;
    if staff.is_empty() {
        println!("No staff found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Initials", "Photo", "Active"]);
    for s in staff {
        let initials = s.initials();
        table.add_row(vec![
            s.id.to_string(),
            s.name,
            initials,
            s.photo_url.unwrap_or_else(|| "-".into()),
            if s.active { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Records that `staff_id` completed `task_id` at `at`.
///
/// Both must exist and be active, and a task can be completed once per day.
pub fn complete_task(store: &Store, task_id: u64, staff_id: u64, at: NaiveDateTime) -> Result<Completion> {
    let task = store.load_task(task_id)?.ok_or(Error::TaskNotFound(task_id))?;
    if !task.active {
        return Err(Error::TaskInactive(task_id));
    }
    let member = store
        .load_staff()?
        .into_iter()
        .find(|s| s.id == staff_id)
        .ok_or(Error::StaffNotFound(staff_id))?;
    if !member.active {
        return Err(Error::StaffInactive(staff_id));
    }

    let mut completions = store.load_completions()?;
    let today = at.date();
    if completions_on(&completions, today).any(|c| c.task_id == task_id) {
        warn!(task_id, staff_id, "duplicate completion rejected");
        return Err(Error::AlreadyCompleted { task_id, date: today });
    }
    let completion = Completion { id: next_id(&completions), task_id, staff_id, completed_at: at };
    completions.push(completion.clone());
    store.save_completions(&completions)?;
    info!(task_id, staff_id, completion_id = completion.id, "task completed");
    Ok(completion)
}

pub fn cmd_complete(store: &Store, task_id: u64, staff_id: u64, at: NaiveDateTime, silent: bool) -> Result<()> {
    let completion = complete_task(store, task_id, staff_id, at)?;
    if !silent {
        println!("Task {} completed by staff {} at {}.", task_id, staff_id, completion.completed_at.format("%H:%M"));
    }
    Ok(())
}

/// Removes the completion of `task_id` on the day of `at`.
pub fn undo_completion(store: &Store, task_id: u64, at: NaiveDateTime) -> Result<Completion> {
    let mut completions = store.load_completions()?;
    let today = at.date();
    let idx = completions
        .iter()
        .position(|c| c.task_id == task_id && c.completed_at.date() == today)
        .ok_or(Error::NotCompleted(task_id))?;
    let removed = completions.remove(idx);
    store.save_completions(&completions)?;
    info!(task_id, completion_id = removed.id, "completion undone");
    Ok(removed)
}

pub fn cmd_undo(store: &Store, task_id: u64, at: NaiveDateTime, silent: bool) -> Result<()> {
    undo_completion(store, task_id, at)?;
    if !silent { println!("Completion of task {} undone.", task_id); }
    Ok(())
}

/// Today's board at `at`.
pub fn today_board(store: &Store, at: NaiveDateTime) -> Result<Vec<BoardEntry>> {
    Ok(build_board(&store.load_tasks()?, &store.load_completions()?, &store.load_staff()?, at))
}

/// Prints today's board, ordered by deadline.
pub fn cmd_today(store: &Store, at: NaiveDateTime, title: &str) -> Result<()> {
    let entries = today_board(store, at)?;
    println!("{} - {}", title, at.format("%a %d %b %Y %H:%M"));
    if entries.is_empty() {
        println!("No tasks scheduled for today.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Frequency").add_attribute(Attribute::Bold),
            Cell::new("Points").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for e in entries {
        let (status, color) = if let Some(s) = &e.completed_by {
            (format!("Done ({})", s.name), Color::Green)
        } else if e.completed_today {
            ("Done".to_string(), Color::Green)
        } else if e.overdue {
            ("OVERDUE".to_string(), Color::Red)
        } else {
            ("Pending".to_string(), Color::Yellow)
        };
        let title_cell = if matches!(e.task.recurrence, Recurrence::SpecificDate { .. }) {
            Cell::new(&e.task.title).add_attribute(Attribute::Bold)
        } else {
            Cell::new(&e.task.title)
        };
        table.add_row(vec![
            Cell::new(e.task.id),
            Cell::new(time_label(e.task.due_time.as_deref())).fg(if e.overdue { Color::Red } else { Color::Reset }),
            title_cell,
            Cell::new(frequency_label(&e.task.recurrence)),
            Cell::new(e.task.points),
            Cell::new(status).fg(color),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Leaderboard for `[from, to]`.
pub fn leaderboard(store: &Store, from: NaiveDate, to: NaiveDate) -> Result<Vec<Standing>> {
    if from > to {
        return Err(Error::Invalid(format!("range start {} is after end {}", from, to)));
    }
    Ok(standings(&store.load_tasks()?, &store.load_staff()?, &store.load_completions()?, from, to))
}

pub fn cmd_leaderboard(store: &Store, from: NaiveDate, to: NaiveDate) -> Result<()> {
    let rows = leaderboard(store, from, to)?;
    println!("Leaderboard {} to {}", from, to);
    if rows.is_empty() {
        println!("No completions in this range.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL)
        .set_header(vec!["Rank", "Name", "Completions", "Points"]);
    for (i, r) in rows.into_iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), r.name, r.completions.to_string(), r.points.to_string()]);
    }
    println!("{table}");
    Ok(())
}

fn check_author(store: &Store, author_id: Option<u64>) -> Result<()> {
    if let Some(id) = author_id {
        if !store.load_staff()?.iter().any(|s| s.id == id) {
            return Err(Error::StaffNotFound(id));
        }
    }
    Ok(())
}

/// Posts a note to the feed and returns its id.
pub fn add_note(store: &Store, body: &str, author_id: Option<u64>, parent_id: Option<u64>, at: NaiveDateTime) -> Result<u64> {
    let body = require_text(body, "note")?;
    check_author(store, author_id)?;
    let mut notes = store.load_notes()?;
    let parent_id = match parent_id {
        Some(pid) => {
            let parent = notes.iter().find(|n| n.id == pid).ok_or(Error::NoteNotFound(pid))?;
            // Replies to replies join the root thread.
            Some(parent.parent_id.unwrap_or(parent.id))
        }
        None => None,
    };
    let id = next_id(&notes);
    notes.push(Note { id, body, author_id, parent_id, created_at: at });
    store.save_notes(&notes)?;
    info!(note_id = id, ?parent_id, "note added");
    Ok(id)
}

pub fn cmd_note_add(store: &Store, body: String, author_id: Option<u64>, parent_id: Option<u64>, silent: bool) -> Result<u64> {
    let id = add_note(store, &body, author_id, parent_id, now_local())?;
    if !silent { println!("Note added (id = {})", id); }
    Ok(id)
}

/// Deletes a note and, for a thread root, its replies.
pub fn cmd_note_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    let mut notes = store.load_notes()?;
    let len_before = notes.len();
    notes.retain(|n| n.id != id && n.parent_id != Some(id));
    if notes.len() == len_before {
        return Err(Error::NoteNotFound(id));
    }
    store.save_notes(&notes)?;
    info!(note_id = id, removed = len_before - notes.len(), "note removed");
    if !silent { println!("Note {} removed.", id); }
    Ok(())
}

/// A thread root with its replies.
#[derive(Debug, Clone)]
pub struct Thread {
    pub note: Note,
    pub replies: Vec<Note>,
}

/// Threads newest first; replies oldest first.
pub fn note_feed(store: &Store) -> Result<Vec<Thread>> {
    let notes = store.load_notes()?;
    let mut threads: Vec<Thread> = notes
        .iter()
        .filter(|n| n.parent_id.is_none())
        .map(|root| {
            let mut replies: Vec<Note> = notes.iter().filter(|n| n.parent_id == Some(root.id)).cloned().collect();
            replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Thread { note: root.clone(), replies }
        })
        .collect();
    threads.sort_by(|a, b| b.note.created_at.cmp(&a.note.created_at).then(b.note.id.cmp(&a.note.id)));
    Ok(threads)
}

pub fn cmd_note_list(store: &Store) -> Result<()> {
    let threads = note_feed(store)?;
    if threads.is_empty() {
        println!("No notes.");
        return Ok(());
    }
    let staff = store.load_staff()?;
    let author = |id: Option<u64>| {
        id.and_then(|id| staff.iter().find(|s| s.id == id))
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Anonymous".into())
    };
    for t in threads {
        println!("[{}] {} - {}: {}", t.note.id, t.note.created_at.format("%Y-%m-%d %H:%M"), author(t.note.author_id), t.note.body);
        for r in t.replies {
            println!("    [{}] {} - {}: {}", r.id, r.created_at.format("%Y-%m-%d %H:%M"), author(r.author_id), r.body);
        }
    }
    Ok(())
}

/// Deletes every table after confirmation.
pub fn cmd_reset(store: &Store, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks, staff, completions and notes? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.reset()?;
    println!("Database reset successfully.");
    Ok(())
}
