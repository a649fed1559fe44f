//! Invocation event decoding and validation.
//!
//! The event's `method` field selects the variant; each variant carries only
//! the fields its workflow needs, so downstream code never checks for field
//! presence. Legacy event names (`shp2agol`, `fs_conf_path`, `wm_id`, ...)
//! are accepted as aliases.

use serde::Deserialize;

use crate::error::RequestError;
use crate::types::{optional_id, Catalog, ItemId};

/// A decoded invocation event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Request {
    /// Shapefiles in object storage → published feature services.
    #[serde(alias = "shp2agol")]
    Import(ImportRequest),
    /// Published feature services → shapefiles in object storage.
    #[serde(alias = "agol2s3")]
    Export(ExportRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportRequest {
    pub data: Vec<ImportItem>,
    pub s3_bucket: String,
    #[serde(alias = "fs_conf_path")]
    pub manifest_path: String,
    #[serde(alias = "shp_s3_path")]
    pub shapefile_path: String,
    /// Capability list for published services; blank means the default policy.
    #[serde(default, alias = "fs_capabilities")]
    pub capabilities: Option<String>,
    /// Shared web map every published service is attached to.
    #[serde(alias = "wm_id")]
    pub webmap_id: ItemId,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportItem {
    /// Title of the feature service to create or overwrite.
    #[serde(alias = "fs_name")]
    pub name: String,
    /// Existing service to overwrite; absent for a new service.
    #[serde(default, alias = "fs_id", deserialize_with = "optional_id")]
    pub id: Option<ItemId>,
    #[serde(alias = "shp_name")]
    pub shapefile_name: String,
    /// Object key suffix, e.g. `.zip`.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportRequest {
    pub data: Vec<ExportItem>,
    pub s3_bucket: String,
    #[serde(alias = "fs_conf_path")]
    pub manifest_path: String,
    #[serde(alias = "target_s3_filepath")]
    pub target_path: String,
    /// Platform export format, e.g. `Shapefile`.
    pub export_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportItem {
    #[serde(alias = "fs_name")]
    pub name: String,
    #[serde(alias = "fs_id")]
    pub id: ItemId,
    #[serde(alias = "shp_name")]
    pub shapefile_name: String,
    pub format: String,
}

impl Request {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RequestError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn method(&self) -> &'static str {
        match self {
            Request::Import(_) => "import",
            Request::Export(_) => "export",
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Request::Import(r) => r.data.len(),
            Request::Export(r) => r.data.len(),
        }
    }

    pub fn s3_bucket(&self) -> &str {
        match self {
            Request::Import(r) => &r.s3_bucket,
            Request::Export(r) => &r.s3_bucket,
        }
    }

    pub fn manifest_path(&self) -> &str {
        match self {
            Request::Import(r) => &r.manifest_path,
            Request::Export(r) => &r.manifest_path,
        }
    }

    /// Check every item against the reconciled catalog.
    ///
    /// Runs before any transfer; the first invalid item aborts the request.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), RequestError> {
        match self {
            Request::Import(r) => r.validate(catalog),
            Request::Export(r) => r.validate(catalog),
        }
    }
}

impl ImportRequest {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), RequestError> {
        for item in &self.data {
            match &item.id {
                None if catalog.has_title(&item.name) => {
                    return Err(RequestError::AmbiguousTarget {
                        name: item.name.clone(),
                    });
                }
                Some(id) if !catalog.contains(id) => {
                    return Err(RequestError::UnknownService {
                        name: item.name.clone(),
                        id: id.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// `shapefile_path + shapefile_name + format`
    pub fn source_key(&self, item: &ImportItem) -> String {
        format!("{}{}{}", self.shapefile_path, item.shapefile_name, item.format)
    }
}

impl ExportRequest {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), RequestError> {
        match self.data.iter().find(|item| !catalog.contains(&item.id)) {
            Some(item) => Err(RequestError::UnknownService {
                name: item.name.clone(),
                id: item.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// `target_path + shapefile_name + format`
    pub fn target_key(&self, item: &ExportItem) -> String {
        format!("{}{}{}", self.target_path, item.shapefile_name, item.format)
    }
}

impl ImportItem {
    /// Local file name for the downloaded source artifact.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.shapefile_name, self.format)
    }
}

impl ExportItem {
    /// Local file name for the downloaded export.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.shapefile_name, self.format)
    }
}
