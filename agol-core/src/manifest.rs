//! Persisted feature-service manifest and its reconciliation against the
//! live catalog.
//!
//! # Storage format
//!
//! ```text
//! [{"fs_name": "Rail Lines", "fs_id": "9a1f..."}, ...]
//! ```
//!
//! The manifest is read wholesale, threaded through a workflow as a value and
//! rewritten wholesale; there are no partial updates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::types::{Catalog, CatalogItem, ItemId, ManifestEntry};

/// Ordered list of manifest entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

/// Result of [`Manifest::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Working manifest for the rest of the invocation.
    pub manifest: Manifest,
    /// Catalog items that were missing from the manifest and got appended.
    pub adopted: Vec<ManifestEntry>,
    /// Entries whose id no longer exists in the catalog (or repeated an id).
    pub dropped: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &ItemId) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id.as_ref() == Some(id))
    }

    /// Parse the stored object. A blank object is an empty manifest.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(ManifestError::Parse)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, ManifestError> {
        serde_json::to_vec(self).map_err(ManifestError::Serialize)
    }

    /// Align the manifest with `catalog`.
    ///
    /// 1. Catalog items whose id is not in the manifest are appended as
    ///    `{name: title, id}`.
    /// 2. Entries whose id is not in the catalog are dropped, as is any later
    ///    entry repeating an id already kept.
    ///
    /// Reconciling an already reconciled manifest is a no-op.
    pub fn reconcile(self, catalog: &Catalog) -> Reconciliation {
        let mut entries = self.entries;
        let mut adopted = Vec::new();

        let known: HashSet<ItemId> = entries.iter().filter_map(|e| e.id.clone()).collect();
        for item in catalog.items() {
            if !known.contains(&item.id) {
                tracing::info!(
                    "feature service {} - {} is in the catalog but not the manifest; adding it",
                    item.title,
                    item.id
                );
                let entry = ManifestEntry::from(item);
                adopted.push(entry.clone());
                entries.push(entry);
            }
        }

        let live = catalog.ids();
        let mut kept_ids: HashSet<ItemId> = HashSet::new();
        let mut kept = Vec::with_capacity(entries.len());
        let mut dropped = Vec::new();
        for entry in entries {
            let keep = match &entry.id {
                Some(id) => live.contains(id) && kept_ids.insert(id.clone()),
                None => false,
            };
            if keep {
                kept.push(entry);
            } else {
                tracing::info!(
                    "manifest entry {} - {} not found in the catalog; removing it",
                    entry.name,
                    entry.id.as_ref().map(ItemId::as_str).unwrap_or("<no id>")
                );
                dropped.push(entry);
            }
        }

        Reconciliation {
            manifest: Manifest::new(kept),
            adopted,
            dropped,
        }
    }

    /// Record a newly published service.
    ///
    /// When `replaced` names an existing entry, that entry's id and name are
    /// overwritten in place; otherwise a new entry is appended.
    pub fn record_published(&mut self, replaced: Option<&ItemId>, service: &CatalogItem) {
        if let Some(old_id) = replaced {
            let mut found = false;
            for entry in self
                .entries
                .iter_mut()
                .filter(|e| e.id.as_ref() == Some(old_id))
            {
                entry.id = Some(service.id.clone());
                entry.name = service.title.clone();
                found = true;
            }
            if found {
                return;
            }
        }
        self.entries.push(ManifestEntry::from(service));
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(entries: Vec<ManifestEntry>) -> Self {
        Self::new(entries)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
