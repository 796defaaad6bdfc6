//! # Chalkboard
//!
//! A kiosk task board for a pharmacy. Shows the tasks due today, lets staff
//! claim completions, keeps a notes feed and a points leaderboard, and gives
//! admins a place to manage task definitions.
//!
//! ## Usage
//!
//! ### Kiosk (TUI)
//!
//! ```bash
//! chalkboard
//! # or explicitly
//! chalkboard ui
//! ```
//!
//! *   `j`/`k`: Move selection
//! *   `Space`/`Enter`: Pick a staff member and mark the task done
//! *   `u`: Undo today's completion
//! *   `v`: Toggle leaderboard
//! *   `r`: Refresh
//! *   `q`: Quit
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Tasks
//! chalkboard task add "Check fridge temps" -f daily --due 09:00
//! chalkboard task add "Order stock" -f weekly --days 1,3,5 --due 14:00 --points 2
//! chalkboard task add "Rotate stock" -f monthly --day 15
//! chalkboard task add "Stocktake" -f specific_date --date 2025-06-30
//! chalkboard task list --status active
//!
//! # Kiosk actions
//! chalkboard today
//! chalkboard complete 3 --staff 2
//! chalkboard leaderboard --from 2025-06-01
//! ```
//!
//! ## Data Storage
//!
//! Tables are JSON files in your local data directory
//! (`~/.local/share/chalkboard` on Linux). Override with `CHALKBOARD_DB`.
//! Log verbosity comes from `CHALKBOARD_LOG` (default `warn`).

use std::io;
use std::process::ExitCode;

use chalkboard::admin::{FrequencyFilter, StatusFilter, TaskFilter};
use chalkboard::commands::*;
use chalkboard::config::Config;
use chalkboard::leaderboard::month_start;
use chalkboard::storage::Store;
use chalkboard::tui::run_tui;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "chalkboard")]
#[command(about = "Pharmacy kiosk task board", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tasks due today
    Today {
        /// Reference time as "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Mark a task done by a staff member
    Complete {
        task: u64,
        /// Staff member who did it
        #[arg(short, long)]
        staff: u64,
    },
    /// Undo today's completion of a task
    Undo {
        task: u64,
    },
    /// Manage task definitions
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage staff
    Staff {
        #[command(subcommand)]
        command: StaffCommands,
    },
    /// Notes feed
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Points per staff member over a date range
    Leaderboard {
        /// First day (YYYY-MM-DD), defaults to the start of this month
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
    },
    /// Reset the database (delete everything)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open the kiosk TUI
    Ui,
}

#[derive(clap::Args)]
struct TaskFields {
    /// daily, weekly, monthly or specific_date
    #[arg(short, long)]
    frequency: Option<String>,
    /// Weekdays for weekly tasks, 0 = Sunday (e.g. 1,3,5)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    days: Option<Vec<i64>>,
    /// Day of month for monthly tasks
    #[arg(long)]
    day: Option<i64>,
    /// Date for specific_date tasks (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    /// Deadline (HH:MM)
    #[arg(long)]
    due: Option<String>,
    /// Points awarded on completion
    #[arg(short, long)]
    points: Option<i64>,
}

impl TaskFields {
    fn into_input(self, title: Option<String>) -> TaskInput {
        TaskInput {
            title,
            frequency: self.frequency,
            days: self.days,
            day: self.day,
            date: self.date,
            due: self.due,
            points: self.points,
            ..TaskInput::default()
        }
    }
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task definition
    Add {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
        /// Create the task inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Edit a task definition
    Edit {
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        /// Remove the deadline
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        /// Activate or deactivate
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a task and its completions
    Remove {
        id: u64,
    },
    /// List task definitions
    List {
        /// Search titles
        #[arg(short, long)]
        search: Option<String>,
        /// all, daily, weekly, monthly, specific_date or none
        #[arg(short, long, default_value = "all")]
        frequency: String,
        /// all, active or inactive
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Move a task to a position in the list
    Move {
        id: u64,
        /// 1-based position
        position: usize,
    },
    /// Set points on several tasks
    Points {
        points: i64,
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Subcommand)]
enum StaffCommands {
    /// Add a staff member
    Add {
        name: String,
        /// Photo URL
        #[arg(long)]
        photo: Option<String>,
    },
    /// Edit a staff member
    Edit {
        id: u64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        photo: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a staff member without completions
    Remove {
        id: u64,
    },
    /// List staff
    List,
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Post a note
    Add {
        body: String,
        /// Author staff id
        #[arg(short, long)]
        staff: Option<u64>,
    },
    /// Reply to a note
    Reply {
        parent: u64,
        body: String,
        #[arg(short, long)]
        staff: Option<u64>,
    },
    /// Remove a note and its replies
    Remove {
        id: u64,
    },
    /// Show the feed
    List,
}

fn init_logging(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn run(command: Commands, store: &Store, config: &Config) -> chalkboard::Result<()> {
    match command {
        Commands::Today { at } => {
            let at = at.as_deref().map(parse_at).transpose()?.unwrap_or_else(now_local);
            cmd_today(store, at, &config.title)
        }
        Commands::Complete { task, staff } => cmd_complete(store, task, staff, now_local(), false),
        Commands::Undo { task } => cmd_undo(store, task, now_local(), false),
        Commands::Task { command } => match command {
            TaskCommands::Add { title, fields, inactive } => {
                let mut input = fields.into_input(Some(title));
                input.active = Some(!inactive);
                cmd_task_add(store, input, false).map(|_| ())
            }
            TaskCommands::Edit { id, title, fields, clear_due, active } => {
                let mut input = fields.into_input(title);
                input.clear_due = clear_due;
                input.active = active;
                cmd_task_edit(store, id, input, false)
            }
            TaskCommands::Remove { id } => cmd_task_remove(store, id, false),
            TaskCommands::List { search, frequency, status } => {
                let filter = TaskFilter {
                    search,
                    frequency: FrequencyFilter::parse(&frequency).ok_or_else(|| {
                        chalkboard::Error::Invalid(format!("unknown frequency filter '{}'", frequency))
                    })?,
                    status: StatusFilter::parse(&status).ok_or_else(|| {
                        chalkboard::Error::Invalid(format!("unknown status filter '{}'", status))
                    })?,
                };
                cmd_task_list(store, &filter)
            }
            TaskCommands::Move { id, position } => cmd_task_move(store, id, position, false),
            TaskCommands::Points { points, ids } => cmd_task_points(store, points, &ids, false),
        },
        Commands::Staff { command } => match command {
            StaffCommands::Add { name, photo } => cmd_staff_add(store, name, photo, false).map(|_| ()),
            StaffCommands::Edit { id, name, photo, active } => cmd_staff_edit(store, id, name, photo, active, false),
            StaffCommands::Remove { id } => cmd_staff_remove(store, id, false),
            StaffCommands::List => cmd_staff_list(store),
        },
        Commands::Note { command } => match command {
            NoteCommands::Add { body, staff } => cmd_note_add(store, body, staff, None, false).map(|_| ()),
            NoteCommands::Reply { parent, body, staff } => cmd_note_add(store, body, staff, Some(parent), false).map(|_| ()),
            NoteCommands::Remove { id } => cmd_note_remove(store, id, false),
            NoteCommands::List => cmd_note_list(store),
        },
        Commands::Leaderboard { from, to } => {
            let to = match to {
                Some(d) => parse_date(&d)?,
                None => now_local().date(),
            };
            let from = match from {
                Some(d) => parse_date(&d)?,
                None => month_start(to),
            };
            cmd_leaderboard(store, from, to)
        }
        Commands::Reset { force } => cmd_reset(store, force),
        Commands::Completions { .. } | Commands::Ui => unreachable!("handled before the store is opened"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return ExitCode::FAILURE;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "chalkboard", &mut io::stdout());
            ExitCode::SUCCESS
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(&config) {
                eprintln!("Error running TUI: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Some(command) => {
            init_logging(&config.log_filter);
            let store = match Store::open(&config.data_dir) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match run(command, &store, &config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
