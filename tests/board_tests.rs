use chalkboard::admin::{frequency_detail, move_to, time_label};
use chalkboard::board::build_board;
use chalkboard::leaderboard::{month_start, standings};
use chalkboard::models::{Completion, Staff, Task};
use chalkboard::recurrence::Recurrence;
use chrono::{NaiveDate, NaiveDateTime};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn task(id: u64, title: &str, recurrence: Recurrence, due: Option<&str>) -> Task {
    Task {
        id,
        title: title.into(),
        recurrence,
        due_time: due.map(str::to_string),
        points: 1,
        active: true,
        sort_index: 1000,
    }
}

fn staff(id: u64, name: &str) -> Staff {
    Staff { id, name: name.into(), photo_url: None, active: true }
}

fn completion(id: u64, task_id: u64, staff_id: u64, when: &str) -> Completion {
    Completion { id, task_id, staff_id, completed_at: at(when) }
}

#[test]
fn test_board_filters_and_sorts() {
    let mut inactive = task(5, "Inactive", Recurrence::Daily, Some("07:00"));
    inactive.active = false;
    let tasks = vec![
        task(1, "open shop", Recurrence::Daily, None),
        task(2, "Banking", Recurrence::Daily, Some("16:00")),
        task(3, "Weekday check", Recurrence::Weekly { days: [1, 2, 3, 4, 5].into() }, Some("09:00")),
        task(4, "Stocktake", Recurrence::SpecificDate { date: Some("2024-03-12".into()) }, Some("09:00")),
        inactive,
        task(6, "Archive", Recurrence::Daily, None),
    ];

    let board = build_board(&tasks, &[], &[], at("2024-03-12 10:00"));
    let titles: Vec<&str> = board.iter().map(|e| e.task.title.as_str()).collect();
    assert_eq!(titles, vec!["Stocktake", "Weekday check", "Banking", "Archive", "open shop"]);
    let overdue: Vec<bool> = board.iter().map(|e| e.overdue).collect();
    assert_eq!(overdue, vec![true, true, false, false, false]);

    let saturday = build_board(&tasks, &[], &[], at("2024-03-16 10:00"));
    assert_eq!(saturday.len(), 3);
    assert!(saturday.iter().all(|e| e.task.recurrence == Recurrence::Daily));
}

#[test]
fn test_board_completion_suppresses_overdue() {
    let tasks = vec![task(1, "Weekday check", Recurrence::Weekly { days: [1, 2, 3, 4, 5].into() }, Some("09:00"))];
    let people = vec![staff(7, "Ann Lee")];

    // Completed yesterday: still overdue today.
    let yesterday = vec![completion(1, 1, 7, "2024-03-11 08:30")];
    let board = build_board(&tasks, &yesterday, &people, at("2024-03-12 10:00"));
    assert!(!board[0].completed_today);
    assert!(board[0].overdue);

    let today = vec![completion(1, 1, 7, "2024-03-12 09:30")];
    let board = build_board(&tasks, &today, &people, at("2024-03-12 10:00"));
    assert!(board[0].completed_today);
    assert!(!board[0].overdue);
    assert_eq!(board[0].completed_by, Some(people[0].clone()));

    // Completion by someone no longer on file still counts.
    let board = build_board(&tasks, &today, &[], at("2024-03-12 10:00"));
    assert!(board[0].completed_today);
    assert_eq!(board[0].completed_by, None);
}

#[test]
fn test_leaderboard() {
    let mut big = task(2, "Big", Recurrence::Daily, None);
    big.points = 5;
    let tasks = vec![task(1, "Small", Recurrence::Daily, None), big];
    let people = vec![staff(1, "Zoe"), staff(2, "Adam"), staff(3, "Beth")];
    let completions = vec![
        completion(1, 1, 1, "2024-03-01 09:00"),
        completion(2, 1, 1, "2024-03-02 09:00"),
        completion(3, 2, 2, "2024-03-02 10:00"),
        completion(4, 1, 3, "2024-03-03 10:00"),
        completion(5, 1, 3, "2024-03-04 10:00"),
        // Outside the range, unknown task, unknown staff.
        completion(6, 2, 3, "2024-02-29 10:00"),
        completion(7, 99, 3, "2024-03-05 10:00"),
        completion(8, 1, 99, "2024-03-05 10:00"),
    ];

    let rows = standings(&tasks, &people, &completions, date("2024-03-01"), date("2024-03-31"));
    let summary: Vec<(&str, usize, i64)> = rows.iter().map(|r| (r.name.as_str(), r.completions, r.points)).collect();
    assert_eq!(summary, vec![("Adam", 1, 5), ("Beth", 2, 2), ("Zoe", 2, 2)]);

    let one_day = standings(&tasks, &people, &completions, date("2024-03-02"), date("2024-03-02"));
    assert_eq!(one_day.len(), 2);
    assert_eq!(month_start(date("2024-03-17")), date("2024-03-01"));
}

#[test]
fn test_admin_labels() {
    assert_eq!(frequency_detail(&Recurrence::Weekly { days: [5, 1, 3].into() }), "Mon, Wed, Fri");
    assert_eq!(frequency_detail(&Recurrence::Weekly { days: Default::default() }), "-");
    assert_eq!(frequency_detail(&Recurrence::Monthly { day: Some(15) }), "Day 15");
    assert_eq!(frequency_detail(&Recurrence::Unrecognized { raw: None }), "-");
    assert_eq!(time_label(Some("09:30:00")), "09:30");
    assert_eq!(time_label(None), "-");
    assert_eq!(staff(1, "ann marie lee").initials(), "AL");
    assert_eq!(staff(1, "Cher").initials(), "C");
}

#[test]
fn test_move_to_unknown_task() {
    let mut tasks = vec![task(1, "A", Recurrence::Daily, None)];
    assert!(!move_to(&mut tasks, 2, 1));
    assert_eq!(tasks[0].sort_index, 1000);
}
