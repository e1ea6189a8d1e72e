//! Module focused on writing individual records into their collection.

use chrono::NaiveDateTime;

use crate::{
    Error,
    domain::{Record, catalog, schema::CollectionSchema},
    error::constraint_error,
    store::{Store, WriteOutcome},
};

const MISSING_KEY: &str = "<missing>";

/// Coerces `record` into the shape of `schema`, checks it and its foreign keys, then performs a get-or-create.
/// Returns the rendered primary key along with the store outcome.
pub(crate) fn write_record(
    store: &mut Store,
    schema: &CollectionSchema,
    record: Record,
    now: NaiveDateTime,
) -> Result<(String, WriteOutcome), Error> {
    let key_hint = record
        .key_of(schema.primary_key())
        .unwrap_or_else(|| MISSING_KEY.to_string());

    let record = schema
        .coerce(record, now)
        .map_err(|msg| constraint_error(schema.name(), &key_hint, msg))?;
    let key = record
        .key_of(schema.primary_key())
        .ok_or_else(|| constraint_error(schema.name(), &key_hint, "primary key is null"))?;
    catalog::check_record(schema.name(), &record)
        .map_err(|msg| constraint_error(schema.name(), &key, msg))?;

    check_foreign_keys(store, schema, &key, &record)?;

    let outcome = store.get_or_create(schema.name(), key.clone(), record)?;
    Ok((key, outcome))
}

/// Every non-null foreign-key value must name an existing record of the referenced collection.
pub(crate) fn check_foreign_keys(
    store: &Store,
    schema: &CollectionSchema,
    key: &str,
    record: &Record,
) -> Result<(), Error> {
    for (field, target) in schema.foreign_keys() {
        let Some(reference) = record.key_of(field) else {
            continue;
        };
        if store.get(target, &reference).is_none() {
            return Err(constraint_error(
                schema.name(),
                key,
                format!("field `{field}` references missing {target} key {reference}"),
            ));
        }
    }
    Ok(())
}
