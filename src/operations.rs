//! Point operations on stored records: search, delete, field updates and flag counts.

use tracing::info;

use crate::{
    Error,
    domain::{
        Record, Value, catalog,
        schema::{CollectionSchema, FieldDefault},
    },
    engine::writer::check_foreign_keys,
    error::{constraint_error, not_found_error},
    store::Store,
};

/// Looks up a record by primary key.
pub fn search<'s>(store: &'s Store, collection: &str, key: &str) -> Result<&'s Record, Error> {
    store
        .get(collection, key)
        .ok_or_else(|| not_found_error(collection, key))
}

/// The schema registered on `store` for `collection`, or the built-in one after the store was reopened.
fn resolve_schema(store: &Store, collection: &str) -> Option<CollectionSchema> {
    store
        .schema(collection)
        .cloned()
        .or_else(|| catalog::by_name(collection))
}

/// Deletes a record unless a record of another collection still references it.
pub fn delete(store: &mut Store, collection: &str, key: &str) -> Result<Record, Error> {
    search(store, collection, key)?;

    for name in store.collection_names() {
        let Some(schema) = resolve_schema(store, name) else {
            continue;
        };
        for (field, target) in schema.foreign_keys() {
            if target != collection {
                continue;
            }
            let referenced = store
                .records(name)
                .any(|record| record.key_of(field).as_deref() == Some(key));
            if referenced {
                return Err(constraint_error(
                    collection,
                    key,
                    format!("still referenced by {name}.{field}"),
                ));
            }
        }
    }

    let removed = store.remove(collection, key)?;
    info!(collection, key, "record deleted");
    Ok(removed)
}

/// Sets `field` of an existing record from a raw value, coerced through the collection schema.
///
/// The primary key and generated fields cannot be changed. Fields generated with [`FieldDefault::UpdatedAt`]
/// are refreshed.
pub fn update_field(
    store: &mut Store,
    collection: &str,
    key: &str,
    field: &str,
    raw: &str,
) -> Result<(), Error> {
    let schema = resolve_schema(store, collection).ok_or_else(|| not_found_error(collection, key))?;
    if field == schema.primary_key() {
        return Err(constraint_error(
            collection,
            key,
            "the primary key cannot be changed",
        ));
    }
    match schema.field(field) {
        None => {
            return Err(constraint_error(
                collection,
                key,
                format!("unknown field `{field}`"),
            ));
        }
        Some(def) if def.default().is_some() => {
            return Err(constraint_error(
                collection,
                key,
                format!("field `{field}` is generated"),
            ));
        }
        Some(_) => {}
    }

    let now = chrono::Local::now().naive_local();
    let mut record = search(store, collection, key)?.clone();
    record.insert(field, Value::from_token(raw.trim()));
    for generated in schema.fields() {
        if generated.default() == Some(FieldDefault::UpdatedAt) {
            record.insert(generated.name(), Value::Timestamp(now));
        }
    }

    let record = schema
        .coerce(record, now)
        .map_err(|msg| constraint_error(collection, key, msg))?;
    catalog::check_record(collection, &record)
        .map_err(|msg| constraint_error(collection, key, msg))?;
    check_foreign_keys(store, &schema, key, &record)?;
    store.replace(collection, key, record)?;
    info!(collection, key, field, "record updated");
    Ok(())
}

/// Number of records of `collection` whose `field` is a set flag.
pub fn count_flagged(store: &Store, collection: &str, field: &str) -> usize {
    store
        .records(collection)
        .filter(|record| record.get(field).and_then(Value::as_flag) == Some(true))
        .count()
}
