//! Invocation driver.
//!
//! ## Pipeline
//!
//! 1. Load credentials from the secret store.
//! 2. Authenticate against the platform.
//! 3. Fetch the feature-service catalog.
//! 4. Load the stored manifest.
//! 5. Reconcile the manifest against the catalog.
//! 6. Validate the request (no remote mutation happens before this passes).
//! 7. Dispatch to the import or export workflow in a fresh scratch directory.

use agol_core::{
    Catalog, Credentials, GisPlatform, Manifest, ObjectStore, PlatformError, Reconciliation,
    Request, SecretStore,
};

use crate::config::Settings;
use crate::error::SyncError;
use crate::export::run_export;
use crate::import::run_import;
use crate::outcome::{ExportReport, ImportReport};
use crate::scratch::ScratchDir;
use crate::secrets::get_credentials;

/// Result of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Import(ImportReport),
    Export(ExportReport),
}

impl Outcome {
    pub fn outcomes(&self) -> &[crate::ItemOutcome] {
        match self {
            Outcome::Import(report) => &report.outcomes,
            Outcome::Export(report) => &report.outcomes,
        }
    }
}

/// Run one invocation end to end.
///
/// `connect` opens the platform session from the loaded credentials, which
/// keeps transport settings out of this crate.
pub fn run<P, F, S, K>(
    settings: &Settings,
    request: &Request,
    secrets: &K,
    storage: &S,
    connect: F,
) -> Result<Outcome, SyncError>
where
    P: GisPlatform,
    F: FnOnce(&Credentials) -> Result<P, PlatformError>,
    S: ObjectStore + ?Sized,
    K: SecretStore + ?Sized,
{
    tracing::info!(
        "{} request with {} item(s)",
        request.method(),
        request.item_count()
    );

    let credentials = get_credentials(secrets, &settings.secret_id)?;
    let platform = connect(&credentials)?;

    let catalog = Catalog::new(platform.search_feature_services()?);
    tracing::info!("catalog has {} feature service(s)", catalog.len());

    let stored = storage.get_object(request.s3_bucket(), request.manifest_path())?;
    let Reconciliation {
        manifest,
        adopted,
        dropped,
    } = Manifest::from_slice(&stored)?.reconcile(&catalog);
    tracing::info!(
        "manifest reconciled: {} entries ({} adopted, {} dropped)",
        manifest.len(),
        adopted.len(),
        dropped.len()
    );

    request.validate(&catalog)?;

    let scratch = ScratchDir::create(settings.scratch_parent.as_deref())?;
    match request {
        Request::Import(import) => {
            run_import(&platform, storage, import, manifest, &scratch).map(Outcome::Import)
        }
        Request::Export(export) => {
            run_export(&platform, storage, export, &scratch).map(Outcome::Export)
        }
    }
}
