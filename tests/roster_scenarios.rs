use student_roster::{Course, RecordStore, RosterView, SnapshotState, StudentRecord};
use tempfile::TempDir;

fn open_store() -> (TempDir, RecordStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = RecordStore::open(dir.path().join("database.db")).expect("open store");
    (dir, store)
}

fn seed(store: &RecordStore) -> Vec<StudentRecord> {
    vec![
        store.create("Ann", Course::Math, "555-0100").unwrap(),
        store.create("Bob", Course::Biology, "555-0101").unwrap(),
        store.create("Cid", Course::Astronomy, "555-0102").unwrap(),
    ]
}

#[test]
fn create_then_read_all_yields_one_new_record() {
    let (_dir, store) = open_store();
    let before = store.read_all().unwrap();

    let created = store.create("Dee", Course::Physics, "555-0103").unwrap();
    let after = store.read_all().unwrap();

    assert_eq!(after.len(), before.len() + 1);
    let new_rows: Vec<_> = after.iter().filter(|row| !before.contains(row)).collect();
    assert_eq!(new_rows, vec![&created]);
    assert_eq!(created.name, "Dee");
    assert_eq!(created.course, Course::Physics);
    assert_eq!(created.mobile, "555-0103");
}

#[test]
fn read_all_is_idempotent() {
    let (_dir, store) = open_store();
    seed(&store);
    assert_eq!(store.read_all().unwrap(), store.read_all().unwrap());
}

#[test]
fn update_changes_only_the_target_record() {
    let (_dir, store) = open_store();
    let seeded = seed(&store);
    let target = &seeded[1];

    store
        .update(target.id, "Robert", Course::Physics, "555-0199")
        .unwrap();

    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), seeded.len());
    assert_eq!(rows[0], seeded[0]);
    assert_eq!(
        rows[1],
        StudentRecord {
            id: target.id,
            name: "Robert".into(),
            course: Course::Physics,
            mobile: "555-0199".into(),
        }
    );
    assert_eq!(rows[2], seeded[2]);
}

#[test]
fn update_on_absent_id_is_a_silent_no_op() {
    let (_dir, store) = open_store();
    let seeded = seed(&store);

    let affected = store.update(999, "Ghost", Course::Math, "000").unwrap();

    assert_eq!(affected, 0);
    assert_eq!(store.read_all().unwrap(), seeded);
}

#[test]
fn delete_removes_exactly_one_record() {
    let (_dir, store) = open_store();
    let seeded = seed(&store);

    store.delete(seeded[0].id).unwrap();

    let rows = store.read_all().unwrap();
    assert_eq!(rows.len(), seeded.len() - 1);
    assert!(rows.iter().all(|row| row.id != seeded[0].id));
}

#[test]
fn delete_on_never_created_id_leaves_rows_unchanged() {
    let (_dir, store) = open_store();
    let seeded = seed(&store);

    let affected = store.delete(4242).unwrap();

    assert_eq!(affected, 0);
    assert_eq!(store.read_all().unwrap(), seeded);
}

#[test]
fn name_search_does_not_match_substrings() {
    let (_dir, store) = open_store();
    store.create("Anna", Course::Math, "1").unwrap();
    assert!(store.read_by_name("Ann").unwrap().is_empty());

    store.create("Ann", Course::Math, "2").unwrap();
    store.create("Ann", Course::Biology, "3").unwrap();
    let found = store.read_by_name("Ann").unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|row| row.name == "Ann"));
}

#[test]
fn single_student_snapshot_and_selection() {
    let (_dir, store) = open_store();
    let mut view = RosterView::new();

    let ann = store.create("Ann", Course::Math, "555-0100").unwrap();
    assert_eq!(ann.id, 1);

    let snapshot = view.refresh(&store).unwrap().to_vec();
    assert_eq!(
        snapshot,
        vec![StudentRecord {
            id: 1,
            name: "Ann".into(),
            course: Course::Math,
            mobile: "555-0100".into(),
        }]
    );
    assert_eq!(view.state(), SnapshotState::Current);
    assert_eq!(view.select_by_name("Ann"), vec![0]);
    assert!(view.select_by_name("Bob").is_empty());
}

#[test]
fn duplicate_names_are_all_found_and_selected() {
    let (_dir, store) = open_store();
    let mut view = RosterView::new();

    let first = view
        .mutate(&store, |store| store.create("Ann", Course::Math, "555-0100"))
        .unwrap()
        .outcome;
    view.mutate(&store, |store| store.create("Bob", Course::Physics, "555-0101"))
        .unwrap();
    let second = view
        .mutate(&store, |store| store.create("Ann", Course::Biology, "555-0102"))
        .unwrap()
        .outcome;
    assert_ne!(first.id, second.id);

    let found = store.read_by_name("Ann").unwrap();
    assert_eq!(found, vec![first.clone(), second.clone()]);

    let positions = view.select_by_name("Ann");
    assert_eq!(positions, vec![0, 2]);
    let selected: Vec<_> = positions.iter().map(|&p| view.get(p).unwrap().id).collect();
    assert_eq!(selected, vec![first.id, second.id]);
}

#[test]
fn view_tracks_every_mutation_kind() {
    let (_dir, store) = open_store();
    let mut view = RosterView::new();
    view.refresh(&store).unwrap();

    let ann = view
        .mutate(&store, |store| store.create("Ann", Course::Math, "555-0100"))
        .unwrap()
        .outcome;
    assert_eq!(view.rows(), store.read_all().unwrap().as_slice());

    view.mutate(&store, |store| {
        store.update(ann.id, "Ann", Course::Astronomy, "555-0111")
    })
    .unwrap();
    assert_eq!(view.get(0).unwrap().course, Course::Astronomy);

    view.mutate(&store, |store| store.delete(ann.id)).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.state(), SnapshotState::Current);
}
