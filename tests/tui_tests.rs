use chalkboard::commands::*;
use chalkboard::storage::Store;
use chalkboard::tui::app::{App, InputMode};
use tempfile::TempDir;

fn task(title: &str, due: Option<&str>) -> TaskInput {
    TaskInput {
        title: Some(title.into()),
        frequency: Some("daily".into()),
        due: due.map(str::to_string),
        ..TaskInput::default()
    }
}

#[test]
fn test_picker_credits_task_chosen_before_reload() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("db")).unwrap();
    let mop = cmd_task_add(&store, task("Mop floor", None), true).unwrap();
    let ann = cmd_staff_add(&store, "Ann".into(), None, true).unwrap();

    let mut app = App::new(Store::open(dir.path().join("db")).unwrap(), "Board".into());
    app.start_complete();
    assert!(app.input_mode == InputMode::PickStaff);

    // A task with an earlier deadline lands in row 0 while the picker is open.
    let alarm = cmd_task_add(&store, task("Set alarm", Some("00:00")), true).unwrap();
    app.reload();
    assert_eq!(app.entries[0].task.id, alarm);

    app.confirm_staff();
    assert!(app.input_mode == InputMode::Normal);
    let completions = store.load_completions().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].task_id, mop);
    assert_eq!(completions[0].staff_id, ann);
}

#[test]
fn test_cancel_forgets_pending_task() {
    let dir = TempDir::new().unwrap();
    let store = Store::open(dir.path().join("db")).unwrap();
    cmd_task_add(&store, task("Mop floor", None), true).unwrap();
    cmd_staff_add(&store, "Ann".into(), None, true).unwrap();

    let mut app = App::new(Store::open(dir.path().join("db")).unwrap(), "Board".into());
    app.start_complete();
    app.cancel();
    assert!(app.pending_task.is_none());
    app.confirm_staff();
    assert!(store.load_completions().unwrap().is_empty());
}
