//! In-memory snapshot of the roster that the front end renders from.
//!
//! The snapshot is never patched in place: after any mutation it is marked
//! stale and rebuilt wholesale from [`RecordStore::read_all`]. Rosters are
//! small enough that a full reload is cheaper to reason about than diffing.

use tracing::debug;

use crate::db::RecordStore;
use crate::error::DataStoreError;
use crate::models::StudentRecord;

/// Whether the snapshot reflects the store as of the last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    /// A mutation happened (or nothing was loaded yet) since the last refresh.
    Stale,
    /// Rows match what `read_all` returned on the most recent refresh.
    Current,
}

/// A mutation that reached the store. The change is committed no matter what
/// `reload` says; a failed reload only means the snapshot is still stale.
#[derive(Debug)]
pub struct Applied<T> {
    /// Whatever the store call returned (created record, affected rows, ...).
    pub outcome: T,
    /// Result of rebuilding the snapshot after the change.
    pub reload: Result<(), DataStoreError>,
}

/// Ordered, displayable copy of every persisted student.
#[derive(Debug)]
pub struct RosterView {
    /// Rows in store order, exactly as the last successful `read_all` returned.
    rows: Vec<StudentRecord>,
    /// Whether `rows` can be trusted to match the store.
    state: SnapshotState,
}

impl Default for RosterView {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterView {
    /// An empty view. Call [`RosterView::refresh`] before rendering it.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            state: SnapshotState::Stale,
        }
    }

    /// Replace the whole snapshot with the store's current contents. If the
    /// store fails the previous rows are kept and the view is left stale.
    pub fn refresh(&mut self, store: &RecordStore) -> Result<&[StudentRecord], DataStoreError> {
        self.mark_stale();
        let rows = store.read_all()?;
        debug!(rows = rows.len(), "roster snapshot refreshed");
        self.rows = rows;
        self.state = SnapshotState::Current;
        Ok(&self.rows)
    }

    /// Run a single store mutation, then rebuild the snapshot.
    ///
    /// `Err` means the mutation itself failed and nothing changed, rows and
    /// state included. `Ok` means the store accepted the change; check
    /// [`Applied::reload`] to learn whether the snapshot caught up with it.
    pub fn mutate<T, F>(&mut self, store: &RecordStore, op: F) -> Result<Applied<T>, DataStoreError>
    where
        F: FnOnce(&RecordStore) -> Result<T, DataStoreError>,
    {
        let outcome = op(store)?;
        let reload = self.refresh(store).map(|_| ());
        Ok(Applied { outcome, reload })
    }

    /// Flag the snapshot as out of date without touching its rows.
    pub fn mark_stale(&mut self) {
        self.state = SnapshotState::Stale;
    }

    /// Current position in the stale/current cycle.
    pub fn state(&self) -> SnapshotState {
        self.state
    }

    /// All rows in display order.
    pub fn rows(&self) -> &[StudentRecord] {
        &self.rows
    }

    /// Row at `position`, if the snapshot is that long.
    pub fn get(&self, position: usize) -> Option<&StudentRecord> {
        self.rows.get(position)
    }

    /// Number of rows currently displayed.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the store held no students at the last refresh.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row position of the record with `id`, if it is in the snapshot.
    pub fn position_of(&self, id: i64) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// Positions (ascending) of every row whose name equals `name` exactly.
    /// No trimming, case folding or substring matching. An empty result means
    /// "not found" and should be reported as such.
    pub fn select_by_name(&self, name: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.name == name)
            .map(|(position, _)| position)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use rusqlite::Connection;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, RecordStore) {
        let dir = TempDir::new().expect("create temp dir");
        let store = RecordStore::open(dir.path().join("database.db")).expect("open store");
        (dir, store)
    }

    /// Write a row whose course no longer decodes, so every later `read_all`
    /// fails while inserts keep working.
    fn plant_unreadable_row(store: &RecordStore) {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO students (name, course, mobile) VALUES ('Zed', 'Chemistry', '0')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn starts_stale_and_empty() {
        let view = RosterView::new();
        assert_eq!(view.state(), SnapshotState::Stale);
        assert!(view.is_empty());
    }

    #[test]
    fn refresh_replaces_rows_and_marks_current() {
        let (_dir, store) = temp_store();
        let mut view = RosterView::new();
        store.create("Ann", Course::Math, "555-0100").unwrap();

        let rows = view.refresh(&store).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(view.state(), SnapshotState::Current);

        store.create("Bob", Course::Physics, "555-0101").unwrap();
        view.mark_stale();
        assert_eq!(view.state(), SnapshotState::Stale);
        assert_eq!(view.len(), 1);

        view.refresh(&store).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view.rows(), store.read_all().unwrap().as_slice());
    }

    #[test]
    fn mutate_refreshes_after_success() {
        let (_dir, store) = temp_store();
        let mut view = RosterView::new();
        view.refresh(&store).unwrap();

        let applied = view
            .mutate(&store, |store| store.create("Ann", Course::Math, "555-0100"))
            .unwrap();
        assert!(applied.reload.is_ok());
        let ann = applied.outcome;

        assert_eq!(view.state(), SnapshotState::Current);
        assert_eq!(view.position_of(ann.id), Some(0));
        assert_eq!(view.get(0), Some(&ann));
    }

    #[test]
    fn failed_mutation_leaves_snapshot_alone() {
        let (_dir, store) = temp_store();
        store.create("Ann", Course::Math, "555-0100").unwrap();
        let mut view = RosterView::new();
        view.refresh(&store).unwrap();

        let result: Result<Applied<()>, _> = view.mutate(&store, |_| {
            Err(DataStoreError::new("failed to insert student", "disk full"))
        });

        assert!(result.is_err());
        assert_eq!(view.state(), SnapshotState::Current);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn failed_refresh_keeps_rows_and_goes_stale() {
        let (_dir, store) = temp_store();
        store.create("Ann", Course::Math, "555-0100").unwrap();
        let mut view = RosterView::new();
        view.refresh(&store).unwrap();
        let before = view.rows().to_vec();

        plant_unreadable_row(&store);
        let err = view.refresh(&store).unwrap_err();

        assert_eq!(err.context(), "failed to collect students");
        assert_eq!(view.rows(), before.as_slice());
        assert_eq!(view.state(), SnapshotState::Stale);
    }

    #[test]
    fn committed_mutation_reports_failed_reload_separately() {
        let (_dir, store) = temp_store();
        store.create("Ann", Course::Math, "555-0100").unwrap();
        let mut view = RosterView::new();
        view.refresh(&store).unwrap();
        let before = view.rows().to_vec();

        plant_unreadable_row(&store);
        let applied = view
            .mutate(&store, |store| store.create("Dee", Course::Physics, "555-0103"))
            .expect("insert itself succeeds");

        assert_eq!(applied.outcome.name, "Dee");
        assert!(applied.reload.is_err());
        assert_eq!(view.rows(), before.as_slice());
        assert_eq!(view.state(), SnapshotState::Stale);
    }

    #[test]
    fn select_by_name_matches_whole_names_only() {
        let (_dir, store) = temp_store();
        for (name, mobile) in [("Ann", "1"), ("Anna", "2"), ("ann", "3"), ("Ann", "4")] {
            store.create(name, Course::Biology, mobile).unwrap();
        }
        let mut view = RosterView::new();
        view.refresh(&store).unwrap();

        assert_eq!(view.select_by_name("Ann"), vec![0, 3]);
        assert_eq!(view.select_by_name("Anna"), vec![1]);
        assert_eq!(view.select_by_name(" Ann"), Vec::<usize>::new());
        assert!(view.select_by_name("Bob").is_empty());
        // Search selects; it never hides rows.
        assert_eq!(view.len(), 4);
    }
}
