//! In-memory collaborators that record every call.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use agol_core::{
    CatalogItem, GisPlatform, ItemId, ObjectStore, PlatformError, SecretStore, SecretStoreError,
    ServiceDefinition, StorageError,
};

pub const BUCKET: &str = "ntad";
pub const MANIFEST_KEY: &str = "conf/fs.json";
pub const WEBMAP: &str = "wm1";

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Search,
    GetItem(ItemId),
    AddShapefile { title: String },
    Delete(ItemId),
    Publish { staging: ItemId, name: String },
    UpdateDefinition { id: ItemId, capabilities: String },
    AddToWebmap { webmap: ItemId, id: ItemId },
    Export { id: ItemId, title: String, format: String },
    Download { id: ItemId, dest: PathBuf, dest_existed: bool },
}

#[derive(Default)]
struct PlatformState {
    catalog: RefCell<Vec<CatalogItem>>,
    calls: RefCell<Vec<PlatformCall>>,
    next_id: Cell<usize>,
    fail_publish: RefCell<HashSet<String>>,
    fail_definition: RefCell<HashSet<String>>,
    unconfirmed_webmap: Cell<bool>,
    unconfirmed_delete: RefCell<HashSet<ItemId>>,
    fail_download: Cell<bool>,
}

/// Cloning shares state, so a clone can be handed to the driver while the
/// test keeps one to inspect.
#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Rc<PlatformState>,
}

impl FakePlatform {
    pub fn with_catalog(items: &[(&str, &str)]) -> Self {
        let platform = Self::default();
        *platform.state.catalog.borrow_mut() = items
            .iter()
            .map(|(id, title)| CatalogItem::new(*id, *title))
            .collect();
        platform
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.calls.borrow().clone()
    }

    pub fn catalog_ids(&self) -> Vec<ItemId> {
        self.state
            .catalog
            .borrow()
            .iter()
            .map(|i| i.id.clone())
            .collect()
    }

    pub fn fail_publish(&self, name: &str) {
        self.state.fail_publish.borrow_mut().insert(name.to_string());
    }

    pub fn fail_definition(&self, name: &str) {
        self.state
            .fail_definition
            .borrow_mut()
            .insert(name.to_string());
    }

    pub fn unconfirm_webmap(&self) {
        self.state.unconfirmed_webmap.set(true);
    }

    pub fn unconfirm_delete(&self, id: &str) {
        self.state
            .unconfirmed_delete
            .borrow_mut()
            .insert(ItemId::from(id));
    }

    pub fn fail_download(&self) {
        self.state.fail_download.set(true);
    }

    /// Deletes of ids starting with `prefix`.
    pub fn deletes_of(&self, prefix: &str) -> Vec<ItemId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlatformCall::Delete(id) if id.as_str().starts_with(prefix) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PlatformCall::AddShapefile { .. }))
            .count()
    }

    /// True when nothing but the catalog search was called.
    pub fn only_searched(&self) -> bool {
        self.calls().iter().all(|c| *c == PlatformCall::Search)
    }

    fn record(&self, call: PlatformCall) {
        self.state.calls.borrow_mut().push(call);
    }

    fn fresh_id(&self, prefix: &str) -> ItemId {
        let n = self.state.next_id.get() + 1;
        self.state.next_id.set(n);
        ItemId::from(format!("{prefix}-{n}"))
    }
}

impl GisPlatform for FakePlatform {
    fn search_feature_services(&self) -> Result<Vec<CatalogItem>, PlatformError> {
        self.record(PlatformCall::Search);
        Ok(self.state.catalog.borrow().clone())
    }

    fn get_item(&self, id: &ItemId) -> Result<CatalogItem, PlatformError> {
        self.record(PlatformCall::GetItem(id.clone()));
        self.state
            .catalog
            .borrow()
            .iter()
            .find(|i| &i.id == id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound { id: id.clone() })
    }

    fn add_shapefile(&self, title: &str, path: &Path) -> Result<ItemId, PlatformError> {
        assert!(path.exists(), "staged file {} must exist", path.display());
        self.record(PlatformCall::AddShapefile {
            title: title.to_string(),
        });
        Ok(self.fresh_id("staging"))
    }

    fn delete_item(&self, id: &ItemId) -> Result<bool, PlatformError> {
        self.record(PlatformCall::Delete(id.clone()));
        if self.state.unconfirmed_delete.borrow().contains(id) {
            return Ok(false);
        }
        self.state.catalog.borrow_mut().retain(|i| &i.id != id);
        Ok(true)
    }

    fn publish_shapefile(&self, staging: &ItemId, name: &str) -> Result<CatalogItem, PlatformError> {
        self.record(PlatformCall::Publish {
            staging: staging.clone(),
            name: name.to_string(),
        });
        if self.state.fail_publish.borrow().contains(name) {
            return Err(PlatformError::JobFailed {
                job: "publish".into(),
                id: staging.clone(),
                status: "failed".into(),
            });
        }
        let service = CatalogItem::new(self.fresh_id("svc"), name);
        self.state.catalog.borrow_mut().push(service.clone());
        Ok(service)
    }

    fn update_service_definition(
        &self,
        service: &CatalogItem,
        definition: &ServiceDefinition,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::UpdateDefinition {
            id: service.id.clone(),
            capabilities: definition.capabilities.clone(),
        });
        if self.state.fail_definition.borrow().contains(&service.title) {
            return Err(PlatformError::Api {
                endpoint: "updateDefinition".into(),
                code: 400,
                message: "Invalid definition".into(),
            });
        }
        Ok(())
    }

    fn add_to_webmap(&self, webmap: &ItemId, service: &CatalogItem) -> Result<bool, PlatformError> {
        self.record(PlatformCall::AddToWebmap {
            webmap: webmap.clone(),
            id: service.id.clone(),
        });
        Ok(!self.state.unconfirmed_webmap.get())
    }

    fn export_item(&self, id: &ItemId, title: &str, format: &str) -> Result<ItemId, PlatformError> {
        self.record(PlatformCall::Export {
            id: id.clone(),
            title: title.to_string(),
            format: format.to_string(),
        });
        Ok(self.fresh_id("export"))
    }

    fn download_item(&self, id: &ItemId, dest: &Path) -> Result<(), PlatformError> {
        self.record(PlatformCall::Download {
            id: id.clone(),
            dest: dest.to_path_buf(),
            dest_existed: dest.exists(),
        });
        if self.state.fail_download.get() {
            return Err(PlatformError::Http {
                endpoint: format!("content/items/{id}/data"),
                message: "connection reset".into(),
            });
        }
        std::fs::write(dest, format!("export of {id}")).map_err(|e| PlatformError::Io {
            path: dest.to_path_buf(),
            source: e,
        })
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Exists(String),
    Get(String),
    Put(String),
    Download(String),
    Upload(String),
}

#[derive(Default)]
pub struct FakeStore {
    objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
    calls: RefCell<Vec<StoreCall>>,
}

impl FakeStore {
    pub fn with_manifest(json: &str) -> Self {
        let store = Self::default();
        store.insert(MANIFEST_KEY, json.as_bytes());
        store
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects
            .borrow_mut()
            .insert((BUCKET.to_string(), key.to_string()), body.to_vec());
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .borrow()
            .get(&(BUCKET.to_string(), key.to_string()))
            .cloned()
    }

    pub fn manifest_json(&self) -> serde_json::Value {
        let bytes = self.object(MANIFEST_KEY).unwrap_or_default();
        serde_json::from_slice(&bytes).expect("stored manifest is JSON")
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.borrow().clone()
    }

    pub fn puts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Put(_)))
            .count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.borrow_mut().push(call);
    }

    fn missing(bucket: &str, key: &str) -> StorageError {
        StorageError::Object {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: "NoSuchKey".into(),
        }
    }
}

impl ObjectStore for FakeStore {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, StorageError> {
        self.record(StoreCall::Exists(key.to_string()));
        Ok(self
            .objects
            .borrow()
            .contains_key(&(bucket.to_string(), key.to_string())))
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.record(StoreCall::Get(key.to_string()));
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Self::missing(bucket, key))
    }

    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        self.record(StoreCall::Put(key.to_string()));
        self.objects
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    fn download_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        self.record(StoreCall::Download(key.to_string()));
        let body = self
            .objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Self::missing(bucket, key))?;
        std::fs::write(dest, body).map_err(|e| StorageError::Io {
            path: dest.to_path_buf(),
            source: e,
        })
    }

    fn upload_file(&self, bucket: &str, key: &str, src: &Path) -> Result<(), StorageError> {
        self.record(StoreCall::Upload(key.to_string()));
        let body = std::fs::read(src).map_err(|e| StorageError::Io {
            path: src.to_path_buf(),
            source: e,
        })?;
        self.objects
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

pub struct FakeSecrets {
    value: Option<String>,
}

impl FakeSecrets {
    pub fn valid() -> Self {
        Self {
            value: Some(r#"{"AGOL_USER": "svc", "AGOL_PASS": "hunter2"}"#.to_string()),
        }
    }

    pub fn denied() -> Self {
        Self { value: None }
    }
}

impl SecretStore for FakeSecrets {
    fn secret_string(&self, secret_id: &str) -> Result<String, SecretStoreError> {
        self.value.clone().ok_or_else(|| SecretStoreError::Store {
            secret_id: secret_id.to_string(),
            message: "AccessDeniedException".into(),
        })
    }
}
