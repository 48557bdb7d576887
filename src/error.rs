//! Error types for the document store

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the document store
///
/// Storage-medium failures propagate synchronously to the caller of the
/// operation that triggered them; nothing is retried internally. Lookups
/// that find nothing return `Option::None` rather than an error — only
/// the strict update variant reports `NotFound`.
#[derive(Debug, Error)]
pub enum Error {
    /// The data file exists but could not be parsed
    ///
    /// Raised at load time only. The store refuses to proceed rather than
    /// silently resetting to an empty state.
    #[error("corrupt data file {path:?}: {source}")]
    Corrupt {
        /// Path of the offending file
        path: PathBuf,
        /// Parse failure reported by serde
        #[source]
        source: serde_json::Error,
    },

    /// The storage medium failed during load or flush
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record payload was not a JSON object
    #[error("record must be a JSON object, got {0}")]
    InvalidRecord(&'static str),

    /// A table operation was applied to a key holding a scalar
    #[error("key {key:?} holds a {kind}, expected a table")]
    WrongType {
        /// The offending key
        key: String,
        /// Kind of entry actually stored there
        kind: &'static str,
    },

    /// No record matched a strict update
    #[error("no matching record")]
    NotFound,
}
