//! Per-item outcomes and workflow reports.

use serde::Serialize;

use agol_core::{ItemId, Manifest};

/// What happened to one request item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ItemOutcome {
    /// Published (and, when `replaced` is set, substituted for an existing service).
    Imported {
        name: String,
        id: ItemId,
        replaced: Option<ItemId>,
    },
    /// Source artifact missing; nothing was changed.
    Skipped { name: String, reason: String },
    /// Publish, configure or attach failed; the staging item was cleaned up.
    Failed { name: String, reason: String },
    /// Exported and uploaded to `key`.
    Exported { name: String, key: String },
}

impl ItemOutcome {
    pub fn name(&self) -> &str {
        match self {
            ItemOutcome::Imported { name, .. }
            | ItemOutcome::Skipped { name, .. }
            | ItemOutcome::Failed { name, .. }
            | ItemOutcome::Exported { name, .. } => name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Imported { .. } => "imported",
            ItemOutcome::Skipped { .. } => "skipped",
            ItemOutcome::Failed { .. } => "failed",
            ItemOutcome::Exported { .. } => "exported",
        }
    }

    /// Identifier or key the item ended up at, or the reason it did not.
    pub fn detail(&self) -> String {
        match self {
            ItemOutcome::Imported {
                id,
                replaced: Some(old),
                ..
            } => format!("{id} (replaced {old})"),
            ItemOutcome::Imported { id, .. } => id.to_string(),
            ItemOutcome::Skipped { reason, .. } | ItemOutcome::Failed { reason, .. } => {
                reason.clone()
            }
            ItemOutcome::Exported { key, .. } => key.clone(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Result of an import: per-item outcomes and the manifest as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub outcomes: Vec<ItemOutcome>,
    pub manifest: Manifest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub outcomes: Vec<ItemOutcome>,
}
