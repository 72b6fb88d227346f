//! Local persistence.
//!
//! The file store is the only durable owner of repository and annotation
//! data. Everything lives under one data directory as whole-file JSON
//! writes, so an aborted sync can never leave a half-written snapshot.

mod file;

use thiserror::Error;

pub use file::FileStore;

/// Errors from the local snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot has never been written.
    #[error("snapshot not found")]
    NotFound,

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
