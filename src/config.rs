use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Environment variable that points the app at a specific database file.
pub const DB_PATH_ENV: &str = "STUDENT_ROSTER_DB";

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-roster";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "database.db";
/// Log file written next to the database; the terminal belongs to the TUI.
const LOG_FILE_NAME: &str = "roster.log";

/// Where the roster keeps its on-disk artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from `STUDENT_ROSTER_DB`, falling back to
    /// `~/.student-roster/database.db`.
    pub fn from_env() -> Result<Self> {
        let db_path = match non_empty(env::var_os(DB_PATH_ENV)) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };
        Ok(Self::for_database(db_path))
    }

    /// Build a config around an explicit database file.
    pub fn for_database(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let log_path = db_path.with_file_name(LOG_FILE_NAME);
        Self { db_path, log_path }
    }
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|value| !value.is_empty())
}

fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
