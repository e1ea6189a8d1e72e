//! Integration tests for inventory items stored as tagged records

use bulk_import::{
    Error, ImportOptions, ImportOutcome, InventoryItem, ItemKind, Record, Store, catalog,
    import_file,
};
use rust_decimal_macros::dec;

use crate::{fixture_path, run_import};

#[test]
fn imported_items_convert_to_their_kind() {
    let mut store = Store::in_memory();

    let outcome = import_file(
        fixture_path("inventory.csv"),
        &mut store,
        &catalog::inventory(),
        ImportOptions::default(),
        |e| panic!("unexpected error: {e}"),
        |_| {},
    )
    .unwrap();
    assert_eq!(outcome, ImportOutcome::new(3, 0));

    let items: Vec<InventoryItem> = store
        .records("inventory")
        .map(|r| InventoryItem::try_from(r).unwrap())
        .collect();

    assert_eq!(
        items[0].kind,
        ItemKind::Furniture {
            material: "oak".to_string(),
            size: "L".to_string(),
        }
    );
    assert_eq!(items[0].market_price, dec!(450.00));
    assert_eq!(
        items[1].kind,
        ItemKind::ElectricAppliance {
            brand: "Acme".to_string(),
            voltage: "230".to_string(),
        }
    );
    assert_eq!(items[2].kind, ItemKind::Plain);
}

#[test]
fn item_written_through_the_store_reads_back_unchanged() {
    let item = InventoryItem {
        product_code: "I900".to_string(),
        description: "Sofa".to_string(),
        market_price: dec!(999.99),
        rental_price: dec!(59.00),
        kind: ItemKind::Furniture {
            material: "leather".to_string(),
            size: "XL".to_string(),
        },
    };
    let record = Record::from(&item);
    let line = catalog::inventory()
        .input_fields()
        .iter()
        .map(|field| record.get(field).map(ToString::to_string).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");
    let mut store = Store::in_memory();

    let run = run_import(
        &mut store,
        &catalog::inventory(),
        &line,
        ImportOptions::default(),
    );

    assert_eq!(run.outcome, ImportOutcome::new(1, 0));
    let stored = store.get("inventory", "I900").unwrap();
    assert_eq!(InventoryItem::try_from(stored).unwrap(), item);
}

#[test]
fn rows_with_an_invalid_kind_are_rejected() {
    let input = "\
I9,Thing,1,1,spaceship,,,,
I8,Chair,1,1,furniture,,,,
I7,Lamp,1,1,electric_appliance,,,Acme,
I6,Stool,1,1,furniture,pine,S,,";
    let mut store = Store::in_memory();

    let run = run_import(
        &mut store,
        &catalog::inventory(),
        input,
        ImportOptions::default(),
    );

    assert_eq!(run.outcome, ImportOutcome::new(1, 3));
    let rejected: Vec<_> = run
        .errors
        .iter()
        .filter_map(|e| match e {
            Error::Constraint { key, .. } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(rejected, vec!["I9", "I8", "I7"]);
    assert!(
        store
            .records("inventory")
            .all(|r| InventoryItem::try_from(r).is_ok())
    );
}
