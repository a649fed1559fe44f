//! Domain types for the AGOL sync driver.
//!
//! Persisted and wire field names are fixed by existing deployments
//! (`fs_name` / `fs_id` in the manifest, camelCase in service definitions);
//! the Rust field names stay descriptive and serde maps between the two.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed platform item identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Deserialize an optional id, treating `null`, a missing field and `""` alike.
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).map(ItemId))
}

// ---------------------------------------------------------------------------
// Remote catalog
// ---------------------------------------------------------------------------

/// A feature service as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    /// Service endpoint; present for published feature services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: None,
            owner: None,
        }
    }
}

/// Snapshot of the remote catalog taken once per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn has_title(&self, title: &str) -> bool {
        self.items.iter().any(|item| item.title == title)
    }

    pub fn ids(&self) -> HashSet<&ItemId> {
        self.items.iter().map(|item| &item.id).collect()
    }
}

impl From<Vec<CatalogItem>> for Catalog {
    fn from(items: Vec<CatalogItem>) -> Self {
        Self::new(items)
    }
}

// ---------------------------------------------------------------------------
// Manifest entry
// ---------------------------------------------------------------------------

/// One `{fs_name, fs_id}` record of the persisted manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "fs_name")]
    pub name: String,
    /// Absent only for an item that has not been published yet.
    #[serde(
        rename = "fs_id",
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ItemId>,
}

impl ManifestEntry {
    pub fn new(name: impl Into<String>, id: impl Into<ItemId>) -> Self {
        Self {
            name: name.into(),
            id: Some(id.into()),
        }
    }
}

impl From<&CatalogItem> for ManifestEntry {
    fn from(item: &CatalogItem) -> Self {
        Self {
            name: item.title.clone(),
            id: Some(item.id.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Platform login resolved from the secret store.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Service definition
// ---------------------------------------------------------------------------

/// Capability list applied when the import request does not name one.
pub const DEFAULT_CAPABILITIES: &str =
    "Query, Editing, Create, Update, Delete, ChangeTracking, Extract";

/// Editor-tracking policy applied to every published service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorTrackingInfo {
    pub enable_editor_tracking: bool,
    pub enable_ownership_access_control: bool,
    pub allow_others_to_update: bool,
    pub allow_others_to_delete: bool,
    pub allow_others_to_query: bool,
    pub allow_anonymous_to_update: bool,
    pub allow_anonymous_to_delete: bool,
}

impl Default for EditorTrackingInfo {
    fn default() -> Self {
        Self {
            enable_editor_tracking: true,
            enable_ownership_access_control: false,
            allow_others_to_update: true,
            allow_others_to_delete: true,
            allow_others_to_query: true,
            allow_anonymous_to_update: true,
            allow_anonymous_to_delete: true,
        }
    }
}

/// Body of the service `updateDefinition` call made after publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub has_static_data: bool,
    pub capabilities: String,
    pub editor_tracking_info: EditorTrackingInfo,
}

impl ServiceDefinition {
    /// Editable definition with `capabilities`, or [`DEFAULT_CAPABILITIES`]
    /// when `None` or blank.
    pub fn editable(capabilities: Option<&str>) -> Self {
        let capabilities = capabilities
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CAPABILITIES);
        Self {
            has_static_data: false,
            capabilities: capabilities.to_owned(),
            editor_tracking_info: EditorTrackingInfo::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
