//! Property-based tests for the tally and the batch windowing.

use std::num::NonZeroUsize;

use bulk_import::{Batches, ImportOptions, ImportOutcome, Store, catalog};
use proptest::prelude::*;

use crate::run_import;

fn customer_line(i: usize) -> String {
    format!("C{i},First{i},Last{i},{i} Main St,555-{i:04},c{i}@example.com,active,{i}.50")
}

/// Builds an input of `n` well-formed lines with a malformed line at every position flagged in `malformed`.
fn mixed_input(n: usize, malformed: &[bool]) -> (String, usize) {
    let mut bad = 0;
    let lines: Vec<String> = (0..n)
        .map(|i| {
            if malformed[i % malformed.len()] {
                bad += 1;
                format!("broken,{i}")
            } else {
                customer_line(i)
            }
        })
        .collect();
    (lines.join("\n"), bad)
}

fn options(window: usize) -> ImportOptions {
    ImportOptions {
        window: NonZeroUsize::new(window).unwrap(),
        skip_header: false,
    }
}

proptest! {
    #[test]
    fn well_formed_records_all_succeed(n in 0usize..60, window in 1usize..8) {
        let input: Vec<String> = (0..n).map(customer_line).collect();
        let mut store = Store::in_memory();

        let run = run_import(&mut store, &catalog::customers(), &input.join("\n"), options(window));

        prop_assert_eq!(run.outcome, ImportOutcome::new(n, 0));
        prop_assert_eq!(store.count("customers"), n);
    }

    #[test]
    fn malformed_lines_never_block_the_rest(
        n in 1usize..60,
        malformed in prop::collection::vec(any::<bool>(), 1..10),
        window in 1usize..8,
    ) {
        let (input, bad) = mixed_input(n, &malformed);
        let mut store = Store::in_memory();

        let run = run_import(&mut store, &catalog::customers(), &input, options(window));

        prop_assert_eq!(run.outcome, ImportOutcome::new(n - bad, bad));
        prop_assert_eq!(run.errors.len(), bad);
    }

    #[test]
    fn reimport_fails_every_record(n in 1usize..40, window in 1usize..8) {
        let input: String = (0..n).map(customer_line).collect::<Vec<_>>().join("\n");
        let mut store = Store::in_memory();

        run_import(&mut store, &catalog::customers(), &input, options(window));
        let second = run_import(&mut store, &catalog::customers(), &input, options(window));

        prop_assert_eq!(second.outcome, ImportOutcome::new(0, n));
    }

    #[test]
    fn batches_partition_the_source(
        lines in prop::collection::vec("[a-z0-9,]{0,12}", 0..50),
        window in 1usize..10,
    ) {
        let input: String = lines.iter().map(|l| format!("{l}\n")).collect();

        let batches: Vec<_> = Batches::new(input.as_bytes(), options(window))
            .collect::<Result<_, _>>()
            .unwrap();

        prop_assert_eq!(batches.len(), lines.len().div_ceil(window));
        prop_assert!(batches.iter().all(|b| !b.lines.is_empty() && b.lines.len() <= window));
        let rejoined: Vec<String> = batches.into_iter().flat_map(|b| b.lines).collect();
        prop_assert_eq!(rejoined, lines);
    }
}
