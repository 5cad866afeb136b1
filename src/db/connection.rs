use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{DataStoreError, StoreResultExt};

/// Open a fresh connection to the roster database. Callers hold it only for
/// the duration of one store operation; dropping it closes the handle.
pub(crate) fn open_connection(path: &Path) -> Result<Connection, DataStoreError> {
    Connection::open(path).store_context("failed to open SQLite database")
}

/// Create the data directory and the `students` table if they are missing.
/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row
/// again.
pub(crate) fn ensure_schema(path: &Path) -> Result<(), DataStoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).store_context("failed to create data directory")?;
    }

    let conn = open_connection(path)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            course TEXT NOT NULL,
            mobile TEXT NOT NULL
        )",
        [],
    )
    .store_context("failed to create students table")?;

    debug!(path = %path.display(), "students schema ready");
    Ok(())
}
