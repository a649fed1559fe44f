use tokio::runtime::{Builder, Runtime};

/// Private runtime that drives SDK futures to completion on the calling thread.
pub(crate) fn blocking_runtime() -> std::io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
