//! Traits for the three external collaborators.
//!
//! All calls block until the collaborator answers. Implementations live in
//! `agol-gis` (ArcGIS REST) and `agol-aws` (S3, Secrets Manager); tests use
//! in-memory fakes.

use std::path::Path;

use crate::error::{PlatformError, SecretStoreError, StorageError};
use crate::types::{CatalogItem, ItemId, ServiceDefinition};

/// An authenticated session against the GIS content platform.
pub trait GisPlatform {
    /// Feature services visible to this session's search scope (owner or group).
    fn search_feature_services(&self) -> Result<Vec<CatalogItem>, PlatformError>;

    fn get_item(&self, id: &ItemId) -> Result<CatalogItem, PlatformError>;

    /// Upload a shapefile as a staging content item, overwriting any item with
    /// the same title. Returns the staging item's id.
    fn add_shapefile(&self, title: &str, path: &Path) -> Result<ItemId, PlatformError>;

    /// Delete an item. `Ok(false)` means the platform did not confirm the delete.
    fn delete_item(&self, id: &ItemId) -> Result<bool, PlatformError>;

    /// Publish a staging shapefile item as a hosted feature service.
    fn publish_shapefile(&self, staging: &ItemId, name: &str) -> Result<CatalogItem, PlatformError>;

    fn update_service_definition(
        &self,
        service: &CatalogItem,
        definition: &ServiceDefinition,
    ) -> Result<(), PlatformError>;

    /// Add `service` as operational layers of the web map. `Ok(false)` means
    /// the platform did not confirm the update.
    fn add_to_webmap(&self, webmap: &ItemId, service: &CatalogItem) -> Result<bool, PlatformError>;

    /// Export an item; returns the id of the transient export item.
    fn export_item(&self, id: &ItemId, title: &str, format: &str) -> Result<ItemId, PlatformError>;

    /// Download an item's data to `dest`.
    fn download_item(&self, id: &ItemId, dest: &Path) -> Result<(), PlatformError>;
}

/// Bucket/key object storage.
pub trait ObjectStore {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError>;

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Overwrites any existing object.
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError>;

    fn download_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError>;

    /// Overwrites any existing object.
    fn upload_file(&self, bucket: &str, key: &str, src: &Path) -> Result<(), StorageError>;
}

/// Named secret lookup.
pub trait SecretStore {
    fn secret_string(&self, secret_id: &str) -> Result<String, SecretStoreError>;
}
