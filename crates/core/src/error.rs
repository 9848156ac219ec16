//! Error types for catalog reading
//!
//! Reader-side failures are errors; differences between two valid catalogs
//! are not. Those are reported as data by the comparator.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::field::{FieldId, FieldKind};
use std::io;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog reading and writing
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (open, stat, read)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Zero-byte input, detected before any header parse
    #[error("Empty catalog file: {0}")]
    EmptyFile(String),

    /// Declared header counts are internally inconsistent
    #[error("Corrupt catalog header: {0}")]
    CorruptHeader(String),

    /// Fewer bytes available than the header or a tree requires
    #[error("Truncated catalog while reading {what}: needed {expected} bytes at offset {offset}, only {available} available")]
    TruncatedFile {
        /// What was being read ("header", "tree 3", ...)
        what: String,
        /// Absolute byte offset of the read
        offset: u64,
        /// Bytes the read required
        expected: u64,
        /// Bytes actually available from `offset`
        available: u64,
    },

    /// Byte slice does not match the record size
    #[error("Malformed record: expected {expected} bytes, got {actual}")]
    MalformedRecord {
        /// Record size from the layout
        expected: usize,
        /// Length of the slice handed to the decoder
        actual: usize,
    },

    /// Tree index outside `[0, tree_count)`
    #[error("Tree index {index} out of range [0, {tree_count})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of trees in the catalog
        tree_count: usize,
    },

    /// A forward-only reader or writer was asked to go back or skip ahead
    #[error("Non-sequential access: expected tree {expected}, requested {requested}")]
    NonSequentialAccess {
        /// The only index the stream can serve next
        expected: usize,
        /// Index the caller asked for
        requested: usize,
    },

    /// Field name does not name a record field
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Value kind does not match the field's kind
    #[error("Field {field} holds {expected} values, got {actual}")]
    FieldKindMismatch {
        /// Field being assigned
        field: FieldId,
        /// Kind the layout declares
        expected: FieldKind,
        /// Kind of the supplied value
        actual: FieldKind,
    },

    /// Invalid configuration value or file
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error raised while opening a named catalog
    #[error("{path}: {source}")]
    Catalog {
        /// Path of the catalog
        path: String,
        /// Underlying error
        source: Box<Error>,
    },
}

impl Error {
    /// Create a corrupt-header error
    pub fn corrupt_header(msg: impl Into<String>) -> Self {
        Error::CorruptHeader(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a truncation error for a read of `expected` bytes at `offset`
    pub fn truncated(what: impl Into<String>, offset: u64, expected: u64, available: u64) -> Self {
        Error::TruncatedFile {
            what: what.into(),
            offset,
            expected,
            available,
        }
    }

    /// Label the error with the catalog it belongs to.
    ///
    /// `EmptyFile` already names its file and already-labelled errors keep
    /// their first label; both come back unchanged.
    pub fn in_catalog(self, path: impl Into<String>) -> Self {
        match self {
            Error::EmptyFile(_) | Error::Catalog { .. } => self,
            other => Error::Catalog {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error beneath any catalog label
    pub fn root(&self) -> &Error {
        match self {
            Error::Catalog { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the catalog as a whole can no longer be trusted.
    ///
    /// A truncated tree or a bad index only spoils that one read; the caller
    /// may keep using the catalog for other trees.
    pub fn is_fatal_for_catalog(&self) -> bool {
        !matches!(
            self.root(),
            Error::TruncatedFile { .. } | Error::IndexOutOfRange { .. }
        )
    }
}
