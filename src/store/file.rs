//! JSON document file backing a [`Store`](super::Store).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::Error;
use crate::store::{Collection, unavailable};

pub(super) fn load(path: &Path) -> Result<BTreeMap<String, Collection>, Error> {
    let dir = parent_dir(path);
    if !dir.is_dir() {
        return Err(unavailable(path, "directory does not exist"));
    }

    match File::open(path) {
        Ok(file) => serde_json::from_reader(BufReader::new(file))
            .map_err(|e| unavailable(path, format!("corrupt store file: {e}"))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(unavailable(path, e)),
    }
}

/// Writes to a sibling temporary file first, so a failed write never truncates the previous state.
pub(super) fn save(path: &Path, collections: &BTreeMap<String, Collection>) -> Result<(), Error> {
    let tmp = tempfile::NamedTempFile::new_in(parent_dir(path)).map_err(|e| unavailable(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, collections)
            .map_err(|e| unavailable(path, e))?;
        writer.flush().map_err(|e| unavailable(path, e))?;
    }
    tmp.persist(path).map_err(|e| unavailable(path, e.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
