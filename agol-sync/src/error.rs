//! Error types for agol-sync.

use std::path::PathBuf;

use thiserror::Error;

use agol_core::{
    ItemId, ManifestError, PlatformError, RequestError, SecretStoreError, StorageError,
};

/// Everything that ends an invocation.
///
/// Per-item publish, configure and attach failures are not errors; they are
/// reported as [`crate::ItemOutcome::Failed`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Secrets(#[from] SecretStoreError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The platform did not confirm deletion of the service an import item
    /// was meant to replace.
    #[error("deletion of feature service {id} was not confirmed; aborting before publishing its replacement")]
    ReplaceNotConfirmed { id: ItemId },

    /// A shapefile name and format that do not end in a file name.
    #[error("'{name}' does not name a file")]
    InvalidFileName { name: String },

    /// Scratch directory I/O, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
