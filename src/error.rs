//! Module defining the errors which are exposed to the users of the crate

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input source or the destination store cannot be opened, read or written
    #[error("source unavailable: {resource}: {message}")]
    SourceUnavailable { resource: String, message: String },

    /// A destination collection cannot be created or verified
    #[error("schema creation failed: collection {collection}: {message}")]
    SchemaCreation { collection: String, message: String },

    /// A raw line that does not map onto the expected fields
    #[error("parse error: line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A record whose primary key is already present in the collection
    #[error("duplicate key: collection {collection}, key {key}")]
    DuplicateKey { collection: String, key: String },

    /// A record violating the collection schema (types, nullability, foreign keys, uniqueness)
    #[error("constraint violation: collection {collection}, key {key}: {message}")]
    Constraint {
        collection: String,
        key: String,
        message: String,
    },

    /// A lookup by primary key that matched nothing
    #[error("not found: collection {collection}, key {key}")]
    NotFound { collection: String, key: String },
}

impl Error {
    /// Fatal errors abort an import; all others are counted per record.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::SourceUnavailable { .. } | Error::SchemaCreation { .. }
        )
    }
}

pub(crate) fn source_unavailable(
    resource: impl Into<String>,
    message: impl ToString,
) -> Error {
    Error::SourceUnavailable {
        resource: resource.into(),
        message: message.to_string(),
    }
}

pub(crate) fn schema_creation_error(
    collection: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::SchemaCreation {
        collection: collection.into(),
        message: message.into(),
    }
}

pub(crate) fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

pub(crate) fn duplicate_key_error(collection: impl Into<String>, key: impl Into<String>) -> Error {
    Error::DuplicateKey {
        collection: collection.into(),
        key: key.into(),
    }
}

pub(crate) fn constraint_error(
    collection: impl Into<String>,
    key: impl Into<String>,
    message: impl Into<String>,
) -> Error {
    Error::Constraint {
        collection: collection.into(),
        key: key.into(),
        message: message.into(),
    }
}

pub(crate) fn not_found_error(collection: impl Into<String>, key: impl Into<String>) -> Error {
    Error::NotFound {
        collection: collection.into(),
        key: key.into(),
    }
}
