//! Invocation settings that are not part of the event.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Secret store id of the `{AGOL_USER, AGOL_PASS}` bundle.
    pub secret_id: String,
    /// Where per-invocation scratch directories are created. `None` uses the
    /// system temp directory.
    pub scratch_parent: Option<PathBuf>,
}

impl Settings {
    pub fn new(secret_id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            scratch_parent: None,
        }
    }

    pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(parent.into());
        self
    }
}
