use std::path::PathBuf;

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON tables.
    pub data_dir: PathBuf,
    /// `tracing` filter directive for the CLI.
    pub log_filter: String,
    /// Heading shown on the kiosk board.
    pub title: String,
}

impl Config {
    /// Reads the configuration.
    ///
    /// The data directory is determined in the following order:
    /// 1. `CHALKBOARD_DB` environment variable.
    /// 2. `~/.local/share/chalkboard` (on Linux).
    /// 3. `./chalkboard` (fallback).
    pub fn from_env() -> Config {
        let data_dir = std::env::var("CHALKBOARD_DB").map(PathBuf::from).unwrap_or_else(|_| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("chalkboard");
            p
        });
        Config {
            data_dir,
            log_filter: std::env::var("CHALKBOARD_LOG").unwrap_or_else(|_| "warn".into()),
            title: std::env::var("CHALKBOARD_TITLE").unwrap_or_else(|_| "Pharmacy Chalkboard".into()),
        }
    }
}
