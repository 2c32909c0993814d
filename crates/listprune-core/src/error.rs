//! Error types for listprune

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by the remote platform seams
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Target record or list does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Platform throttled the request
    #[error("rate limited")]
    RateLimited,

    /// Credential rejected
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// Connection, TLS, or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("decode error: {0}")]
    Decode(String),
}

/// Snapshot file errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

/// List aggregation errors
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Fetching list {list_id} failed: {source}")]
    Fetch {
        list_id: String,
        #[source]
        source: RemoteError,
    },
    #[error("List {list_id} returned cursor {cursor} a second time")]
    CursorCycle { list_id: String, cursor: String },
    #[error("Empty list identifier")]
    EmptyListId,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Deletion driver errors. Only durability failures abort a run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Loading work queue failed: {0}")]
    Load(#[source] StorageError),
    #[error("Persisting work queue failed: {0}")]
    Persist(#[source] StorageError),
}
