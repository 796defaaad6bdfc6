use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Completion, Note, Staff, Task};

const TASKS_FILE: &str = "tasks.json";
const STAFF_FILE: &str = "staff.json";
const COMPLETIONS_FILE: &str = "completions.json";
const NOTES_FILE: &str = "notes.json";

/// Rows that carry a numeric primary key.
pub trait Keyed {
    fn key(&self) -> u64;
}

impl Keyed for Task {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for Staff {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for Completion {
    fn key(&self) -> u64 {
        self.id
    }
}

impl Keyed for Note {
    fn key(&self) -> u64 {
        self.id
    }
}

/// Next free id for a table: one past the largest in use.
pub fn next_id<T: Keyed>(rows: &[T]) -> u64 {
    rows.iter().map(Keyed::key).max().unwrap_or(0) + 1
}

/// JSON-file tables in a single data directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Opens the store, creating the directory if it does not exist yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Store> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Store { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Reads a table. A missing file is an empty table.
    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut f = OpenOptions::new().read(true).open(&path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<T> = serde_json::from_str(&s)?;
        debug!(file, rows = rows.len(), "loaded table");
        Ok(rows)
    }

    /// Overwrites a table.
    fn save<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<()> {
        let s = serde_json::to_string_pretty(rows)?;
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.path(file))?;
        f.write_all(s.as_bytes())?;
        debug!(file, rows = rows.len(), "saved table");
        Ok(())
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        self.load(TASKS_FILE)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.save(TASKS_FILE, tasks)
    }

    /// Loads a single task by its ID.
    pub fn load_task(&self, id: u64) -> Result<Option<Task>> {
        Ok(self.load_tasks()?.into_iter().find(|t| t.id == id))
    }

    pub fn load_staff(&self) -> Result<Vec<Staff>> {
        self.load(STAFF_FILE)
    }

    pub fn save_staff(&self, staff: &[Staff]) -> Result<()> {
        self.save(STAFF_FILE, staff)
    }

    pub fn load_completions(&self) -> Result<Vec<Completion>> {
        self.load(COMPLETIONS_FILE)
    }

    pub fn save_completions(&self, completions: &[Completion]) -> Result<()> {
        self.save(COMPLETIONS_FILE, completions)
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        self.load(NOTES_FILE)
    }

    pub fn save_notes(&self, notes: &[Note]) -> Result<()> {
        self.save(NOTES_FILE, notes)
    }

    /// Deletes every table file.
    pub fn reset(&self) -> Result<()> {
        for file in [TASKS_FILE, STAFF_FILE, COMPLETIONS_FILE, NOTES_FILE] {
            let path = self.path(file);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        info!(dir = %self.dir.display(), "store reset");
        Ok(())
    }
}
