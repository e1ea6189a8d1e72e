use std::fmt;

use serde::Serialize;


/// Tally of one import run into one collection.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub success_count: usize,
    pub error_count: usize,
}

impl ImportOutcome {
    pub fn new(success_count: usize, error_count: usize) -> Self {
        Self {
            success_count,
            error_count,
        }
    }

    pub fn total(&self) -> usize {
        self.success_count + self.error_count
    }

    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_error(&mut self) {
        self.error_count += 1;
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} failed",
            self.success_count, self.error_count
        )
    }
}

/// Outcome of one job of a multi-collection import.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub collection: String,
    pub outcome: ImportOutcome,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.collection, self.outcome)
    }
}

/// Public DTO representing a successfully written record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    /// 1-based position of the record's line in the source
    pub line: usize,
    pub collection: String,
    pub key: String,
}

impl fmt::Display for Imported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Imported {{ line: {}, collection: {}, key: {} }}",
            self.line, self.collection, self.key
        )
    }
}
