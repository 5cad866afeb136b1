use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use super::connection::{ensure_schema, open_connection};
use crate::error::{DataStoreError, StoreResultExt};
use crate::models::{Course, StudentRecord};

/// Column list shared by every read so `student_from_row` can rely on the
/// positional order.
const SELECT_COLUMNS: &str = "SELECT id, name, course, mobile FROM students";

/// Courses are persisted as their display label (`"Math"`, ...).
impl ToSql for Course {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Unknown labels surface as a conversion error instead of a silent default.
impl FromSql for Course {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<Course>()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Map a `SELECT_COLUMNS` row into the domain struct.
fn student_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        course: row.get(2)?,
        mobile: row.get(3)?,
    })
}

/// Durable CRUD over the `students` table.
///
/// The store only remembers where the database lives. Every operation opens
/// its own connection and drops it before returning, so nothing stays open
/// between calls or while the view is being rebuilt.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// SQLite file opened afresh by every operation.
    path: PathBuf,
}

impl RecordStore {
    /// Point the store at `path`, creating the file and schema on first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DataStoreError> {
        let path = path.into();
        ensure_schema(&path)?;
        info!(path = %path.display(), "record store opened");
        Ok(Self { path })
    }

    /// Location of the backing SQLite file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scoped connection for a single operation; closed when dropped.
    fn connect(&self) -> Result<Connection, DataStoreError> {
        open_connection(&self.path)
    }

    /// Insert a new student and return it with the id SQLite assigned.
    pub fn create(
        &self,
        name: &str,
        course: Course,
        mobile: &str,
    ) -> Result<StudentRecord, DataStoreError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO students (name, course, mobile) VALUES (?1, ?2, ?3)",
            params![name, course, mobile],
        )
        .store_context("failed to insert student")?;

        let id = conn.last_insert_rowid();
        info!(id, %course, "student created");
        Ok(StudentRecord {
            id,
            name: name.to_string(),
            course,
            mobile: mobile.to_string(),
        })
    }

    /// Every persisted student in primary-key order.
    pub fn read_all(&self) -> Result<Vec<StudentRecord>, DataStoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .store_context("failed to prepare students query")?;

        let students = stmt
            .query_map([], student_from_row)
            .store_context("failed to load students")?
            .collect::<Result<Vec<_>, _>>()
            .store_context("failed to collect students")?;

        debug!(count = students.len(), "loaded all students");
        Ok(students)
    }

    /// Students whose name equals `name` exactly. SQLite's default `BINARY`
    /// collation keeps the comparison case-sensitive.
    pub fn read_by_name(&self, name: &str) -> Result<Vec<StudentRecord>, DataStoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE name = ?1 ORDER BY id"))
            .store_context("failed to prepare name search")?;

        let students = stmt
            .query_map([name], student_from_row)
            .store_context("failed to search students")?
            .collect::<Result<Vec<_>, _>>()
            .store_context("failed to collect search results")?;

        debug!(count = students.len(), "searched students by name");
        Ok(students)
    }

    /// Look up a single student, returning `None` when the id is unknown.
    pub fn read_by_id(&self, id: i64) -> Result<Option<StudentRecord>, DataStoreError> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .store_context("failed to prepare student lookup")?;

        let mut rows = stmt
            .query_map([id], student_from_row)
            .store_context("failed to look up student")?;

        let student = rows
            .next()
            .transpose()
            .store_context("failed to read student row")?;
        Ok(student)
    }

    /// Replace name, course and mobile for `id`. Returns the number of rows
    /// touched; an unknown id is not an error and simply yields `0`.
    pub fn update(
        &self,
        id: i64,
        name: &str,
        course: Course,
        mobile: &str,
    ) -> Result<usize, DataStoreError> {
        let conn = self.connect()?;
        let updated = conn
            .execute(
                "UPDATE students SET name = ?1, course = ?2, mobile = ?3 WHERE id = ?4",
                params![name, course, mobile, id],
            )
            .store_context("failed to update student")?;

        if updated == 0 {
            warn!(id, "update matched no student");
        } else {
            info!(id, %course, "student updated");
        }
        Ok(updated)
    }

    /// Permanently remove the student with `id`. Same zero-row contract as
    /// [`RecordStore::update`].
    pub fn delete(&self, id: i64) -> Result<usize, DataStoreError> {
        let conn = self.connect()?;
        let deleted = conn
            .execute("DELETE FROM students WHERE id = ?1", params![id])
            .store_context("failed to delete student")?;

        if deleted == 0 {
            warn!(id, "delete matched no student");
        } else {
            info!(id, "student deleted");
        }
        Ok(deleted)
    }
}
