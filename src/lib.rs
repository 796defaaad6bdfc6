//! Task board for a pharmacy kiosk.
//!
//! The [`recurrence`] module decides which tasks are due on a given day and
//! whether their deadline has passed. Around it sit a small JSON store, the
//! board and leaderboard views, the admin list, and the command handlers used
//! by the `chalkboard` binary and its terminal UI.

pub mod admin;
pub mod board;
pub mod commands;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod models;
pub mod recurrence;
pub mod storage;
pub mod tui;

pub use error::{Error, Result};
