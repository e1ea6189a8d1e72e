//! Module for the import coordinator: drives batches of raw lines through parsing and writing and keeps the tally.

use std::io::BufRead;

use tracing::{debug, info};

use crate::{
    Error,
    domain::schema::CollectionSchema,
    error::duplicate_key_error,
    input::{Batch, Batches, ImportOptions, parse_record},
    output::{ImportOutcome, Imported},
    store::{Store, WriteOutcome},
};

pub(crate) mod writer;


/// Progress of one import run.
#[derive(Debug)]
enum State {
    Init,
    Reading,
    Writing(Batch),
    Done,
}

///
/// Imports every line of `reader` into the collection described by `schema`.
///
/// Per-record failures are counted, reported to `on_error` and never abort the run. Fatal errors
/// (collection cannot be created, source cannot be read) are returned.
///
pub(crate) fn run_import<R: BufRead>(
    reader: R,
    store: &mut Store,
    schema: &CollectionSchema,
    options: ImportOptions,
    mut on_error: impl FnMut(Error),
    mut on_success: impl FnMut(Imported),
) -> Result<ImportOutcome, Error> {
    let fields = schema.input_fields();
    let mut batches = Batches::new(reader, options);
    let mut outcome = ImportOutcome::default();
    let mut state = State::Init;

    loop {
        state = match state {
            State::Init => {
                store.ensure_collection(schema)?;
                info!(
                    collection = schema.name(),
                    window = options.window.get(),
                    "import started"
                );
                State::Reading
            }
            State::Reading => match batches.next() {
                Some(batch) => State::Writing(batch?),
                None => State::Done,
            },
            State::Writing(batch) => {
                debug!(
                    first_line = batch.first_line,
                    lines = batch.lines.len(),
                    "writing batch"
                );
                for (line, raw) in batch.numbered() {
                    match import_line(store, schema, &fields, line, raw) {
                        Ok(imported) => {
                            outcome.record_success();
                            debug!(line, key = %imported.key, "record written");
                            on_success(imported);
                        }
                        Err(err) => {
                            outcome.record_error();
                            debug!(line, raw, "record skipped: {err}");
                            on_error(err);
                        }
                    }
                }
                State::Reading
            }
            State::Done => {
                info!(
                    collection = schema.name(),
                    success = outcome.success_count,
                    errors = outcome.error_count,
                    "import finished"
                );
                return Ok(outcome);
            }
        }
    }
}

fn import_line(
    store: &mut Store,
    schema: &CollectionSchema,
    fields: &[&str],
    line: usize,
    raw: &str,
) -> Result<Imported, Error> {
    let record = parse_record(line, raw, fields)?;
    let now = chrono::Local::now().naive_local();
    let (key, outcome) = writer::write_record(store, schema, record, now)?;
    match outcome {
        WriteOutcome::Created => Ok(Imported {
            line,
            collection: schema.name().to_string(),
            key,
        }),
        WriteOutcome::Existing(_) => Err(duplicate_key_error(schema.name(), key)),
    }
}
