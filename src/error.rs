//! Error types shared across storage and session handling.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a [`crate::storage::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage key must not be empty")]
    EmptyKey,

    #[error("storage is read-only")]
    WriteRejected,
}

/// Failures while resolving or changing the signed-in user.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
