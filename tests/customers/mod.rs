//! Integration tests for importing customer records

use std::num::NonZeroUsize;

use bulk_import::{
    Error, ImportOptions, ImportOutcome, Store, Value, catalog, import_file, operations,
};
use rust_decimal_macros::dec;

use crate::{fixture_path, run_import};

#[test]
fn three_lines_with_one_malformed() {
    // Arrange
    let input = "\
C1,Jo,Doe,1 Main St,555-0100,jo@example.com,active,100.00
C2,Jane,Roe,2 Main St,555-0101,jane@example.com,active,200.00
malformed,line";
    let options = ImportOptions {
        window: NonZeroUsize::new(2).unwrap(),
        skip_header: false,
    };
    let mut store = Store::in_memory();

    // Act
    let run = run_import(&mut store, &catalog::customers(), input, options);

    // Assert
    assert_eq!(run.outcome, ImportOutcome::new(2, 1));
    assert!(matches!(run.errors[0], Error::Parse { line: 3, .. }));
    assert_eq!(run.imported[0].key, "C1");
    assert_eq!(run.imported[1].key, "C2");
    assert_eq!(store.count("customers"), 2);
}

#[test]
fn well_formed_fixture_imports_every_line() {
    let mut store = Store::in_memory();

    let outcome = import_file(
        fixture_path("customers.csv"),
        &mut store,
        &catalog::customers(),
        ImportOptions::default(),
        |e| panic!("unexpected error: {e}"),
        |_| {},
    )
    .unwrap();

    assert_eq!(outcome, ImportOutcome::new(7, 0));
    let c006 = store.get("customers", "C006").unwrap();
    assert_eq!(
        c006.get("home_address"),
        Some(&Value::from("6 Elm Rd, Apt 2"))
    );
    assert_eq!(
        store.get("customers", "C004").unwrap().get("credit_limit"),
        Some(&Value::Decimal(dec!(1500.50)))
    );
    assert_eq!(operations::count_flagged(&store, "customers", "status"), 5);
}

#[test]
fn bad_lines_are_counted_and_skipped() {
    let mut store = Store::in_memory();
    let mut errors = Vec::new();

    let outcome = import_file(
        fixture_path("customers_with_errors.csv"),
        &mut store,
        &catalog::customers(),
        ImportOptions::default(),
        |e| errors.push(e),
        |_| {},
    )
    .unwrap();

    assert_eq!(outcome, ImportOutcome::new(3, 3));
    assert!(matches!(errors[0], Error::Parse { line: 2, .. }));
    assert!(matches!(errors[1], Error::Constraint { ref key, .. } if key == "C102"));
    assert!(matches!(errors[2], Error::Parse { line: 5, .. }));
    for key in ["C101", "C103", "C104"] {
        assert!(store.get("customers", key).is_some(), "{key} missing");
    }
}

#[test]
fn missing_input_file_is_fatal() {
    let mut store = Store::in_memory();

    let err = import_file(
        fixture_path("does_not_exist.csv"),
        &mut store,
        &catalog::customers(),
        ImportOptions::default(),
        |_| {},
        |_| {},
    )
    .unwrap_err();

    assert!(matches!(err, Error::SourceUnavailable { .. }));
    assert!(!store.has_collection("customers"));
}

#[test]
fn over_long_fields_are_constraint_errors() {
    let long_name = "x".repeat(31);
    let input = format!("C1,{long_name},Doe,,,,active,\nC2,Jo,Doe,,,,active,");
    let mut store = Store::in_memory();

    let run = run_import(
        &mut store,
        &catalog::customers(),
        &input,
        ImportOptions::default(),
    );

    assert_eq!(run.outcome, ImportOutcome::new(1, 1));
    assert!(matches!(run.errors[0], Error::Constraint { .. }));
}
