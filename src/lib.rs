mod domain;
mod engine;
mod error;
mod input;
pub mod operations;
mod output;
mod store;
mod telemetry;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub use domain::inventory::{InventoryItem, ItemKind};
pub use domain::schema::{CollectionSchema, FieldDef, FieldDefault, FieldType};
pub use domain::{Record, Value, catalog};
pub use error::Error;
pub use input::{Batch, Batches, DEFAULT_WINDOW, ImportOptions, parse_record};
pub use output::{ImportOutcome, ImportReport, Imported};
pub use store::{Store, WriteOutcome};
pub use telemetry::{level_directive, setup_logging};

use error::source_unavailable;

/// Imports line-oriented, comma-delimited records from `reader` into the collection described by `schema`.
///
/// This is the main entry point of the crate. The collection is created in `store` if absent, then the
/// source is read in batches of at most `options.window` lines. Each line is parsed against the input
/// fields of the schema, coerced into the declared field types and written with get-or-create semantics.
///
/// # Error handling
///
/// A single bad record never aborts the import. Malformed lines, constraint violations and records whose
/// primary key already exists are reported to the caller-supplied `on_error` callback and counted in the
/// returned [`ImportOutcome`]. Only fatal errors (see [`Error::is_fatal`]) are returned as `Err`, before
/// any record of the failing batch is written.
///
/// # Example
///
/// ```no_run
/// use bulk_import::{ImportOptions, Store, catalog, import};
///
/// let reader = std::fs::File::open("customers.csv").unwrap();
/// let mut store = Store::open("file://customers.json").unwrap();
///
/// let outcome = import(
///     reader,
///     &mut store,
///     &catalog::customers(),
///     ImportOptions::default(),
///     |e| eprintln!("skipped: {e}"),
///     |imported| println!("{imported}"),
/// )
/// .unwrap();
/// store.close().unwrap();
/// println!("{outcome}");
/// ```
pub fn import(
    reader: impl Read,
    store: &mut Store,
    schema: &CollectionSchema,
    options: ImportOptions,
    on_error: impl FnMut(Error),
    on_success: impl FnMut(Imported),
) -> Result<ImportOutcome, Error> {
    engine::run_import(
        BufReader::new(reader),
        store,
        schema,
        options,
        on_error,
        on_success,
    )
}

/// Like [`import`], reading from the file at `path`. A missing or unreadable file is [`Error::SourceUnavailable`].
pub fn import_file(
    path: impl AsRef<Path>,
    store: &mut Store,
    schema: &CollectionSchema,
    options: ImportOptions,
    on_error: impl FnMut(Error),
    on_success: impl FnMut(Imported),
) -> Result<ImportOutcome, Error> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| source_unavailable(format!("input {}", path.display()), e))?;
    import(file, store, schema, options, on_error, on_success)
}

/// One source file destined for one collection.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub path: PathBuf,
    pub schema: CollectionSchema,
}

impl ImportJob {
    pub fn new(path: impl Into<PathBuf>, schema: CollectionSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

/// Runs `jobs` one after the other against the same store, returning one report per job in order.
///
/// Order matters: parents must be imported before the collections referencing them. The first fatal
/// error stops the remaining jobs.
pub fn import_many(
    store: &mut Store,
    jobs: &[ImportJob],
    options: ImportOptions,
    mut on_error: impl FnMut(&str, Error),
) -> Result<Vec<ImportReport>, Error> {
    let mut reports = Vec::with_capacity(jobs.len());
    for job in jobs {
        let collection = job.schema.name();
        let outcome = import_file(
            &job.path,
            store,
            &job.schema,
            options,
            |e| on_error(collection, e),
            |_| {},
        )?;
        reports.push(ImportReport {
            collection: collection.to_string(),
            outcome,
        });
    }
    Ok(reports)
}
