//! Module for the destination store: named collections of records keyed by primary key.
//!
//! A [`Store`] is an explicitly opened handle. It is either process-local (`memory://`) or backed by a JSON
//! document file (`file://<path>` or a bare path) that is loaded on open and written back on [`Store::close`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::domain::Record;
use crate::domain::schema::CollectionSchema;
use crate::error::{
    Error, constraint_error, duplicate_key_error, not_found_error, schema_creation_error,
    source_unavailable,
};

mod file;


const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";

/// The records of one collection, keyed by rendered primary key.
pub(crate) type Collection = BTreeMap<String, Record>;

/// Outcome of a get-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// A record with the same primary key was already present; nothing was written
    Existing(Record),
}

#[derive(Debug)]
enum Backend {
    Memory,
    File { path: PathBuf, dirty: bool },
}

/// Handle to the destination store.
#[derive(Debug)]
pub struct Store {
    collections: BTreeMap<String, Collection>,
    schemas: BTreeMap<String, CollectionSchema>,
    backend: Backend,
    closed: bool,
}

impl Store {
    /// Opens a store from a connection string: `memory://`, `file://<path>` or a bare path.
    pub fn open(connection: &str) -> Result<Self, Error> {
        if connection == MEMORY_SCHEME {
            return Ok(Self::in_memory());
        }
        let path = connection.strip_prefix(FILE_SCHEME).unwrap_or(connection);
        Self::open_file(path)
    }

    pub fn in_memory() -> Self {
        Self::with_backend(BTreeMap::new(), Backend::Memory)
    }

    /// Opens a file-backed store. A missing file is an empty store; its directory must exist.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let collections = file::load(&path)?;
        info!(path = %path.display(), collections = collections.len(), "store opened");
        Ok(Self::with_backend(
            collections,
            Backend::File { path, dirty: false },
        ))
    }

    fn with_backend(collections: BTreeMap<String, Collection>, backend: Backend) -> Self {
        Self {
            collections,
            schemas: BTreeMap::new(),
            backend,
            closed: false,
        }
    }

    /// Registers `schema` and creates its collection if absent. Re-creating an existing collection is a no-op.
    pub fn ensure_collection(&mut self, schema: &CollectionSchema) -> Result<(), Error> {
        schema
            .validate()
            .map_err(|msg| schema_creation_error(schema.name(), msg))?;

        if let Some(registered) = self.schemas.get(schema.name()) {
            if registered != schema {
                return Err(schema_creation_error(
                    schema.name(),
                    "collection already registered with a different schema",
                ));
            }
        }

        if !self.collections.contains_key(schema.name()) {
            self.collections
                .insert(schema.name().to_string(), Collection::new());
            self.mark_dirty();
            debug!(collection = schema.name(), "collection created");
        }
        self.schemas
            .insert(schema.name().to_string(), schema.clone());
        Ok(())
    }

    pub fn has_collection(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    /// The schema registered for `collection` by [`Store::ensure_collection`].
    pub fn schema(&self, collection: &str) -> Option<&CollectionSchema> {
        self.schemas.get(collection)
    }

    /// Names of the collections present in the store, registered in this session or loaded from its file.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<&Record> {
        self.collections.get(collection)?.get(key)
    }

    /// Inserts `record` under `key` unless a record with that key exists, in which case that record is returned.
    pub fn get_or_create(
        &mut self,
        collection: &str,
        key: String,
        record: Record,
    ) -> Result<WriteOutcome, Error> {
        let records = self.collection_mut(collection, &key)?;
        let outcome = match records.get(&key) {
            Some(existing) => WriteOutcome::Existing(existing.clone()),
            None => {
                records.insert(key, record);
                WriteOutcome::Created
            }
        };
        if outcome == WriteOutcome::Created {
            self.mark_dirty();
        }
        Ok(outcome)
    }

    /// Plain insert for callers that already checked for absence; fails if the key appeared in the meantime.
    pub fn insert(&mut self, collection: &str, key: String, record: Record) -> Result<(), Error> {
        let records = self.collection_mut(collection, &key)?;
        if records.contains_key(&key) {
            return Err(duplicate_key_error(collection, key));
        }
        records.insert(key, record);
        self.mark_dirty();
        Ok(())
    }

    /// Replaces the record stored under `key`.
    pub fn replace(&mut self, collection: &str, key: &str, record: Record) -> Result<(), Error> {
        let slot = self
            .collection_mut(collection, key)?
            .get_mut(key)
            .ok_or_else(|| not_found_error(collection, key))?;
        *slot = record;
        self.mark_dirty();
        Ok(())
    }

    pub fn remove(&mut self, collection: &str, key: &str) -> Result<Record, Error> {
        let removed = self
            .collection_mut(collection, key)?
            .remove(key)
            .ok_or_else(|| not_found_error(collection, key))?;
        self.mark_dirty();
        Ok(removed)
    }

    /// Records of `collection` in key order; empty for unknown collections.
    pub fn records(&self, collection: &str) -> impl Iterator<Item = &Record> {
        self.collections
            .get(collection)
            .into_iter()
            .flat_map(|records| records.values())
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |c| c.len())
    }

    /// Flushes pending changes and releases the handle.
    pub fn close(mut self) -> Result<(), Error> {
        let result = self.flush();
        self.closed = true;
        result
    }

    fn flush(&mut self) -> Result<(), Error> {
        if let Backend::File { path, dirty } = &mut self.backend {
            if *dirty {
                file::save(path, &self.collections)?;
                *dirty = false;
                info!(path = %path.display(), "store flushed");
            }
        }
        Ok(())
    }

    fn collection_mut(&mut self, collection: &str, key: &str) -> Result<&mut Collection, Error> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| constraint_error(collection, key, "collection does not exist"))
    }

    fn mark_dirty(&mut self) {
        if let Backend::File { dirty, .. } = &mut self.backend {
            *dirty = true;
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            error!("store dropped without close and could not be flushed: {e}");
        }
    }
}

pub(crate) fn unavailable(path: &Path, message: impl ToString) -> Error {
    source_unavailable(format!("store {}", path.display()), message)
}
