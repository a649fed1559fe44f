//! Invocation event input.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use agol_core::Request;

/// Read and decode the event at `path`, or stdin when `path` is `-`.
pub fn read_event(path: &Path) -> Result<Request> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read event from stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("failed to read event {}", path.display()))?
    };
    Request::from_slice(&bytes).context("failed to decode invocation event")
}
