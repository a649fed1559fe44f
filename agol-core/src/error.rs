//! Error types for agol-core.
//!
//! The three collaborator errors ([`PlatformError`], [`StorageError`],
//! [`SecretStoreError`]) are defined here so that every implementation of the
//! traits in [`crate::ports`] reports failures with the same shape.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ItemId;

/// Errors decoding or encoding the persisted manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The stored manifest is not a JSON list of `{fs_name, fs_id}` records.
    #[error("failed to parse manifest: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Invocation event decoding and validation failures.
///
/// Every variant is raised before any remote mutation takes place.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid invocation event: {0}")]
    Decode(#[from] serde_json::Error),

    /// Import item names an existing feature service but gives no id to overwrite.
    #[error(
        "feature service title '{name}' exists in the catalog but no item id was provided to overwrite it"
    )]
    AmbiguousTarget { name: String },

    /// Item id does not resolve to a feature service in the catalog.
    #[error("feature service '{name}' has id {id} which is not in the catalog")]
    UnknownService { name: String, id: ItemId },
}

/// Failures reported by the GIS platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Transport-level failure (connection refused, TLS, non-2xx status).
    #[error("HTTP error calling {endpoint}: {message}")]
    Http { endpoint: String, message: String },

    /// The platform answered with an `error` object.
    #[error("platform error {code} from {endpoint}: {message}")]
    Api {
        endpoint: String,
        code: i64,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Response { endpoint: String, message: String },

    #[error("item {id} not found")]
    NotFound { id: ItemId },

    /// A publish or export job finished in a non-success state or never finished.
    #[error("{job} job for item {id} ended with status '{status}'")]
    JobFailed {
        job: String,
        id: ItemId,
        status: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reported by object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object storage error on s3://{bucket}/{key}: {message}")]
    Object {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures retrieving the platform credentials.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret store rejected request for '{secret_id}': {message}")]
    Store { secret_id: String, message: String },

    #[error("secret '{secret_id}' has no string value")]
    Empty { secret_id: String },

    #[error("secret '{secret_id}' is malformed: {message}")]
    Malformed { secret_id: String, message: String },
}
