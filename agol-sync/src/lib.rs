//! # agol-sync
//!
//! Credential lookup, scratch space and the two transfer workflows.
//!
//! Call [`run`] with a decoded [`agol_core::Request`] to authenticate,
//! reconcile the manifest and dispatch to [`run_import`] or [`run_export`].

pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod import;
pub mod outcome;
pub mod scratch;
pub mod secrets;

pub use config::Settings;
pub use driver::{run, Outcome};
pub use error::SyncError;
pub use export::run_export;
pub use import::run_import;
pub use outcome::{ExportReport, ImportReport, ItemOutcome};
pub use scratch::ScratchDir;
pub use secrets::get_credentials;
