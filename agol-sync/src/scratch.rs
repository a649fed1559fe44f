//! Per-invocation scratch directory.
//!
//! Every invocation gets its own uniquely named directory, removed when the
//! [`ScratchDir`] is dropped, so concurrent invocations on one host never
//! share downloaded files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{io_err, SyncError};

const PREFIX: &str = "agol-sync-";

#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `parent`, or the system temp directory.
    pub fn create(parent: Option<&Path>) -> Result<Self, SyncError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent).map_err(|e| io_err(parent, e))?,
            None => builder
                .tempdir()
                .map_err(|e| io_err(std::env::temp_dir(), e))?,
        };
        tracing::debug!("scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Local path for `file_name`. Only the final component is used; names
    /// without one (`""`, `.`, `..`) are rejected.
    pub fn path_for(&self, file_name: &str) -> Result<PathBuf, SyncError> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| SyncError::InvalidFileName {
                name: file_name.to_string(),
            })?;
        Ok(self.dir.path().join(name))
    }

    /// Remove any leftover file at [`Self::path_for`] and return the path.
    pub fn clear_stale(&self, file_name: &str) -> Result<PathBuf, SyncError> {
        let path = self.path_for(file_name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("removed stale scratch file {}", path.display());
                Ok(path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path),
            Err(e) => Err(io_err(&path, e)),
        }
    }
}
