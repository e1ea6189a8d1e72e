//! Integration tests for repeated imports into the same store

use bulk_import::{Error, ImportOptions, ImportOutcome, Store, catalog, import_file};

use crate::fixture_path;

fn import_customers(store: &mut Store, errors: &mut Vec<Error>) -> ImportOutcome {
    import_file(
        fixture_path("customers.csv"),
        store,
        &catalog::customers(),
        ImportOptions::default(),
        |e| errors.push(e),
        |_| {},
    )
    .unwrap()
}

#[test]
fn second_import_in_the_same_session() {
    let mut store = Store::in_memory();
    let mut errors = Vec::new();

    let first = import_customers(&mut store, &mut errors);
    assert!(errors.is_empty());
    let second = import_customers(&mut store, &mut errors);

    assert_eq!(first, ImportOutcome::new(7, 0));
    assert_eq!(second, ImportOutcome::new(0, 7));
    assert!(errors.iter().all(|e| matches!(e, Error::DuplicateKey { .. })));
    assert_eq!(store.count("customers"), 7);
}

#[test]
fn second_import_after_reopening_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let connection = format!("file://{}", dir.path().join("customers.json").display());
    let mut errors = Vec::new();

    let mut store = Store::open(&connection).unwrap();
    let first = import_customers(&mut store, &mut errors);
    store.close().unwrap();

    let mut store = Store::open(&connection).unwrap();
    let second = import_customers(&mut store, &mut errors);
    store.close().unwrap();

    assert_eq!(first, ImportOutcome::new(7, 0));
    assert_eq!(second, ImportOutcome::new(0, 7));
}

#[test]
fn existing_records_are_not_overwritten() {
    let mut store = Store::in_memory();
    let mut errors = Vec::new();
    import_customers(&mut store, &mut errors);
    let before = store.get("customers", "C001").unwrap().clone();

    import_customers(&mut store, &mut errors);

    assert_eq!(store.get("customers", "C001"), Some(&before));
}
