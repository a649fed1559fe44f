//! AGOL sync core library: domain types, manifest reconciliation, request
//! decoding, collaborator traits, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`manifest`] — manifest codec and reconciliation against the catalog
//! - [`request`] — invocation event decoding and validation
//! - [`ports`] — traits for the GIS platform, object storage and secret store
//! - [`error`] — error taxonomy shared by every crate in the workspace

pub mod error;
pub mod manifest;
pub mod ports;
pub mod request;
pub mod types;

pub use error::{ManifestError, PlatformError, RequestError, SecretStoreError, StorageError};
pub use manifest::{Manifest, Reconciliation};
pub use ports::{GisPlatform, ObjectStore, SecretStore};
pub use request::{ExportItem, ExportRequest, ImportItem, ImportRequest, Request};
pub use types::{
    Catalog, CatalogItem, Credentials, EditorTrackingInfo, ItemId, ManifestEntry,
    ServiceDefinition, DEFAULT_CAPABILITIES,
};
