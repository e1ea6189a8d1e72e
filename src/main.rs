use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use bulk_import::{
    DEFAULT_WINDOW, Error, ImportOptions, ImportOutcome, Imported, Store, catalog, import_file,
    setup_logging,
};
use clap::Parser;

/// Imports comma-delimited records into a destination store, one collection at a time.
#[derive(Parser, Debug)]
#[command(name = "bulk-import", version, about, long_about = None)]
struct Cli {
    /// Line-oriented, comma-delimited input file
    #[arg(long)]
    input: PathBuf,

    /// Log verbosity: 0 = warnings, 1 = info, 2 = debug, 3 = trace (overridden by RUST_LOG)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    debug: u8,

    /// Destination collection
    #[arg(long, default_value = catalog::CUSTOMERS)]
    collection: String,

    /// Destination store: `memory://`, `file://<path>` or a path
    #[arg(long, env = "BULK_IMPORT_STORE", default_value = "file://customers.json")]
    store: String,

    /// Maximum number of lines held in memory at once
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    batch_size: NonZeroUsize,

    /// Skip the first line of the input
    #[arg(long)]
    skip_header: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug)?;

    let schema = catalog::by_name(&cli.collection).ok_or_else(|| {
        anyhow!(
            "unknown collection `{}`, expected one of: {}",
            cli.collection,
            catalog::NAMES.join(", ")
        )
    })?;
    let options = ImportOptions {
        window: cli.batch_size,
        skip_header: cli.skip_header,
    };

    let mut store = Store::open(&cli.store)?;
    let result = import_file(
        &cli.input,
        &mut store,
        &schema,
        options,
        handle_record_error,
        handle_imported,
    );
    // released on every path, including a fatal import error
    let outcome = settle(result, store.close())?;

    println!("{}: {outcome}", schema.name());
    Ok(())
}

/// Combines the import result with the result of closing the store. The import error wins, and a close
/// failure behind it is logged rather than lost.
fn settle(
    result: Result<ImportOutcome, Error>,
    closed: Result<(), Error>,
) -> Result<ImportOutcome, Error> {
    match (result, closed) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(close_error)) => Err(close_error),
        (Err(import_error), Err(close_error)) => {
            tracing::error!("store could not be flushed after a failed import: {close_error}");
            Err(import_error)
        }
        (Err(import_error), Ok(())) => Err(import_error),
    }
}

// Just logs here; the tally already counts the failure
fn handle_record_error(error: Error) {
    tracing::warn!("{error}")
}

fn handle_imported(imported: Imported) {
    tracing::info!("{imported}")
}
