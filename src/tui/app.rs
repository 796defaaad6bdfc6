use chrono::NaiveDateTime;
use ratatui::widgets::TableState;

use crate::board::BoardEntry;
use crate::commands::{complete_task, leaderboard, now_local, staff_by_name, today_board, undo_completion};
use crate::leaderboard::{month_start, Standing};
use crate::models::Staff;
use crate::recurrence::minutes_of;
use crate::storage::Store;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    /// Choosing who completed the selected task.
    PickStaff,
}

#[derive(PartialEq)]
pub enum ViewMode {
    Board,
    Leaderboard,
}

pub struct App {
    pub store: Store,
    pub title: String,
    pub now: NaiveDateTime,
    pub entries: Vec<BoardEntry>,
    pub staff: Vec<Staff>,
    pub standings: Vec<Standing>,
    pub state: TableState,
    pub staff_state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    /// Task id and title captured when the staff picker opened.
    pub pending_task: Option<(u64, String)>,
    pub status: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: Store, title: String) -> App {
        let mut app = App {
            store,
            title,
            now: now_local(),
            entries: Vec::new(),
            staff: Vec::new(),
            standings: Vec::new(),
            state: TableState::default(),
            staff_state: TableState::default(),
            view_mode: ViewMode::Board,
            input_mode: InputMode::Normal,
            pending_task: None,
            status: None,
        };
        app.reload();
        app
    }

    /// Re-reads the clock and all tables.
    pub fn reload(&mut self) {
        self.now = now_local();
        if let Err(e) = self.load() {
            self.status = Some(e.to_string());
        }
        clamp_selection(&mut self.state, self.entries.len());
        clamp_selection(&mut self.staff_state, self.staff.len());
    }

    fn load(&mut self) -> crate::Result<()> {
        self.entries = today_board(&self.store, self.now)?;
        self.staff = staff_by_name(&self.store)?.into_iter().filter(|s| s.active).collect();
        let today = self.now.date();
        self.standings = leaderboard(&self.store, month_start(today), today)?;
        Ok(())
    }

    /// Picks up a new day or minute without touching the selection.
    pub fn tick(&mut self) {
        let now = now_local();
        if now.date() != self.now.date() || minutes_of(now) != minutes_of(self.now) {
            self.reload();
        }
    }

    pub fn next(&mut self) {
        match self.input_mode {
            InputMode::Normal => step(&mut self.state, self.entries.len(), true),
            InputMode::PickStaff => step(&mut self.staff_state, self.staff.len(), true),
        }
    }

    pub fn previous(&mut self) {
        match self.input_mode {
            InputMode::Normal => step(&mut self.state, self.entries.len(), false),
            InputMode::PickStaff => step(&mut self.staff_state, self.staff.len(), false),
        }
    }

    fn selected_entry(&self) -> Option<&BoardEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Opens the staff picker for the selected task.
    pub fn start_complete(&mut self) {
        if self.view_mode != ViewMode::Board {
            return;
        }
        let Some(entry) = self.selected_entry() else { return };
        if entry.completed_today {
            self.status = Some(format!("'{}' is already done today.", entry.task.title));
            return;
        }
        if self.staff.is_empty() {
            self.status = Some("No active staff. Add staff with `chalkboard staff add`.".into());
            return;
        }
        self.pending_task = Some((entry.task.id, entry.task.title.clone()));
        self.input_mode = InputMode::PickStaff;
        clamp_selection(&mut self.staff_state, self.staff.len());
    }

    /// Credits the task chosen in `start_complete` to the selected staff member.
    pub fn confirm_staff(&mut self) {
        let task = self.pending_task.take();
        let member = self.staff_state.selected().and_then(|i| self.staff.get(i)).cloned();
        self.input_mode = InputMode::Normal;
        if let (Some((task_id, title)), Some(member)) = (task, member) {
            self.status = Some(match complete_task(&self.store, task_id, member.id, now_local()) {
                Ok(_) => format!("'{}' done by {}.", title, member.name),
                Err(e) => e.to_string(),
            });
            self.reload();
        }
    }

    pub fn cancel(&mut self) {
        self.pending_task = None;
        self.input_mode = InputMode::Normal;
    }

    /// Removes today's completion of the selected task.
    pub fn undo_selected(&mut self) {
        if self.view_mode != ViewMode::Board {
            return;
        }
        let Some(entry) = self.selected_entry() else { return };
        let (task_id, title) = (entry.task.id, entry.task.title.clone());
        self.status = Some(match undo_completion(&self.store, task_id, now_local()) {
            Ok(_) => format!("'{}' marked not done.", title),
            Err(e) => e.to_string(),
        });
        self.reload();
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Board => ViewMode::Leaderboard,
            ViewMode::Leaderboard => ViewMode::Board,
        };
    }
}

fn step(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => if i >= len - 1 { 0 } else { i + 1 },
        Some(i) => if i == 0 { len - 1 } else { i - 1 },
        None => 0,
    };
    state.select(Some(i));
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else if let Some(i) = state.selected() {
        if i >= len {
            state.select(Some(len - 1));
        }
    } else {
        state.select(Some(0));
    }
}
