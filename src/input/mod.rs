//! Module defining how raw input is read: windowed batches of lines, and the parsing of one line into a record.

use std::io::{BufRead, Seek, SeekFrom};
use std::num::NonZeroUsize;

use crate::domain::{Record, Value};
use crate::error::{Error, parse_error, source_unavailable};


/// Number of raw lines held in memory at once unless configured otherwise.
pub const DEFAULT_WINDOW: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(window) => window,
    None => unreachable!(),
};

/// Options controlling how an input source is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Maximum number of raw lines per batch
    pub window: NonZeroUsize,
    /// Skip the first line of the source
    pub skip_header: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            skip_header: false,
        }
    }
}

/// Parses one raw, comma-delimited line into a record keyed by `fields`.
///
/// Tokens are trimmed and an empty token becomes [`Value::Null`]. Quoted tokens may contain the delimiter.
/// `line` is the 1-based position in the source and only used for error reporting.
pub fn parse_record(line: usize, raw: &str, fields: &[&str]) -> Result<Record, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut row = csv::StringRecord::new();
    let found = reader
        .read_record(&mut row)
        .map_err(|e| parse_error(line, e.to_string()))?;
    if !found {
        // blank line: a single empty token
        row = csv::StringRecord::from(vec![""]);
    }
    // a bare `\r` inside the line ends a csv record early
    let mut rest = csv::StringRecord::new();
    if reader
        .read_record(&mut rest)
        .map_err(|e| parse_error(line, e.to_string()))?
    {
        return Err(parse_error(line, "line holds more than one record"));
    }

    if row.len() != fields.len() {
        return Err(parse_error(
            line,
            format!("expected {} fields, found {}", fields.len(), row.len()),
        ));
    }

    Ok(fields
        .iter()
        .zip(row.iter())
        .map(|(name, token)| (*name, Value::from_token(token)))
        .collect())
}

/// A window of consecutive raw lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based source position of the first line
    pub first_line: usize,
    pub lines: Vec<String>,
}

impl Batch {
    /// Pairs each raw line with its 1-based source position.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines
            .iter()
            .enumerate()
            .map(|(offset, line)| (self.first_line + offset, line.as_str()))
    }
}

/// Lazily splits a line source into batches of at most `window` lines.
///
/// Reading fails with [`Error::SourceUnavailable`] on I/O errors and on lines that are not valid UTF-8.
#[derive(Debug)]
pub struct Batches<R> {
    reader: R,
    window: NonZeroUsize,
    skip_header: bool,
    header_pending: bool,
    lines_read: usize,
    exhausted: bool,
}

impl<R: BufRead> Batches<R> {
    pub fn new(reader: R, options: ImportOptions) -> Self {
        Self {
            reader,
            window: options.window,
            skip_header: options.skip_header,
            header_pending: options.skip_header,
            lines_read: 0,
            exhausted: false,
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| source_unavailable("input", format!("line {}: {e}", self.lines_read + 1)))?;
        if n == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(Some(buf))
    }

    fn next_batch(&mut self) -> Result<Option<Batch>, Error> {
        if self.header_pending {
            self.header_pending = false;
            if self.read_line()?.is_none() {
                self.exhausted = true;
                return Ok(None);
            }
        }

        let first_line = self.lines_read + 1;
        let mut lines = Vec::with_capacity(self.window.get());
        while lines.len() < self.window.get() {
            match self.read_line()? {
                Some(line) => lines.push(line),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Batch { first_line, lines }))
        }
    }
}

impl<R: BufRead + Seek> Batches<R> {
    /// Rewinds the source so that the batch sequence starts over.
    pub fn restart(&mut self) -> Result<(), Error> {
        self.reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| source_unavailable("input", e))?;
        self.header_pending = self.skip_header;
        self.lines_read = 0;
        self.exhausted = false;
        Ok(())
    }
}

impl<R: BufRead> Iterator for Batches<R> {
    type Item = Result<Batch, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        match self.next_batch() {
            Ok(batch) => batch.map(Ok),
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            }
        }
    }
}
