use std::{io, path::PathBuf};

use thiserror::Error;

/// Result alias for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by the file-backed document store.
///
/// Only write paths surface errors; reads degrade to an empty document
/// instead of failing the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while writing the document or its temp file.
    #[error("document io failure at {path}: {source}")]
    Io {
        /// Path the failed operation targeted.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: io::Error,
    },
    /// The document could not be serialized to JSON.
    #[error("document serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    /// Construct an io error tagged with the path it targeted.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
