//! Import workflow: shapefiles in object storage → published feature services.
//!
//! ## Per-item protocol
//!
//! 1. Skip the item if its source object is absent.
//! 2. Download the source into the scratch directory.
//! 3. Upload it as a staging shapefile item.
//! 4. When replacing, delete the existing service (unconfirmed delete aborts
//!    the invocation).
//! 5. Publish the staging item.
//! 6. Record the new service in the manifest.
//! 7. Apply the editable service definition.
//! 8. Attach the service to the shared web map.
//! 9. Delete the staging item.
//!
//! A failure in steps 5–8 marks the item failed and processing continues.
//! The staging item is deleted exactly once on every path after step 3.
//! After the last item the manifest is written back unconditionally.

use agol_core::{
    CatalogItem, GisPlatform, ImportItem, ImportRequest, ItemId, Manifest, ObjectStore,
    ServiceDefinition,
};

use crate::error::SyncError;
use crate::outcome::{ImportReport, ItemOutcome};
use crate::scratch::ScratchDir;

// ---------------------------------------------------------------------------
// Staging guard
// ---------------------------------------------------------------------------

/// Staging content item that is deleted when released or dropped, whichever
/// comes first.
struct StagedItem<'a, P: GisPlatform + ?Sized> {
    platform: &'a P,
    id: ItemId,
    released: bool,
}

impl<'a, P: GisPlatform + ?Sized> StagedItem<'a, P> {
    fn new(platform: &'a P, id: ItemId) -> Self {
        Self {
            platform,
            id,
            released: false,
        }
    }

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn release(mut self) {
        self.delete();
    }

    fn delete(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.platform.delete_item(&self.id) {
            Ok(true) => tracing::debug!("deleted staging item {}", self.id),
            Ok(false) => tracing::warn!("staging item {} delete was not confirmed", self.id),
            Err(e) => tracing::warn!("failed to delete staging item {}: {e}", self.id),
        }
    }
}

impl<P: GisPlatform + ?Sized> Drop for StagedItem<'_, P> {
    fn drop(&mut self) {
        self.delete();
    }
}

// ---------------------------------------------------------------------------
// run_import
// ---------------------------------------------------------------------------

/// Import every item of `request`, threading `manifest` through and writing
/// it to `s3_bucket/manifest_path` once all items are processed.
///
/// Returns the per-item outcomes and the manifest as written. A returned
/// error means the manifest was not written.
pub fn run_import<P, S>(
    platform: &P,
    storage: &S,
    request: &ImportRequest,
    manifest: Manifest,
    scratch: &ScratchDir,
) -> Result<ImportReport, SyncError>
where
    P: GisPlatform + ?Sized,
    S: ObjectStore + ?Sized,
{
    let mut manifest = manifest;
    let mut outcomes = Vec::with_capacity(request.data.len());

    for item in &request.data {
        let outcome = import_item(platform, storage, request, item, &mut manifest, scratch)?;
        outcomes.push(outcome);
    }

    storage.put_object(
        &request.s3_bucket,
        &request.manifest_path,
        manifest.to_vec()?,
    )?;
    tracing::info!(
        "wrote manifest with {} entries to s3://{}/{}",
        manifest.len(),
        request.s3_bucket,
        request.manifest_path
    );

    Ok(ImportReport { outcomes, manifest })
}

fn import_item<P, S>(
    platform: &P,
    storage: &S,
    request: &ImportRequest,
    item: &ImportItem,
    manifest: &mut Manifest,
    scratch: &ScratchDir,
) -> Result<ItemOutcome, SyncError>
where
    P: GisPlatform + ?Sized,
    S: ObjectStore + ?Sized,
{
    // Step 1: source must exist.
    let key = request.source_key(item);
    if !storage.exists(&request.s3_bucket, &key)? {
        tracing::warn!(
            "s3://{}/{key} does not exist; skipping {}",
            request.s3_bucket,
            item.name
        );
        return Ok(ItemOutcome::Skipped {
            name: item.name.clone(),
            reason: format!("s3://{}/{key} does not exist", request.s3_bucket),
        });
    }

    // Step 2: download.
    let local = scratch.path_for(&item.file_name())?;
    storage.download_file(&request.s3_bucket, &key, &local)?;
    tracing::info!("downloaded s3://{}/{key}", request.s3_bucket);

    // Step 3: stage. From here on the guard owns the staging item.
    let staged = StagedItem::new(platform, platform.add_shapefile(&item.name, &local)?);
    tracing::info!("uploaded {} as staging item {}", item.name, staged.id());

    // Step 4: remove the service being replaced.
    if let Some(old_id) = &item.id {
        let existing = platform.get_item(old_id)?;
        if !platform.delete_item(&existing.id)? {
            return Err(SyncError::ReplaceNotConfirmed {
                id: existing.id.clone(),
            });
        }
        tracing::info!("deleted {} - {} for replacement", existing.title, existing.id);
    }

    // Steps 5-8.
    let published = publish(platform, request, item, staged.id(), manifest);

    // Step 9.
    staged.release();

    Ok(match published {
        Ok(service) => {
            tracing::info!("published {} - {}", service.title, service.id);
            ItemOutcome::Imported {
                name: item.name.clone(),
                id: service.id,
                replaced: item.id.clone(),
            }
        }
        Err(reason) => {
            tracing::warn!("{}: {reason}", item.name);
            ItemOutcome::Failed {
                name: item.name.clone(),
                reason,
            }
        }
    })
}

/// Publish, record, configure and attach. Errors are item-level reasons.
fn publish<P>(
    platform: &P,
    request: &ImportRequest,
    item: &ImportItem,
    staging: &ItemId,
    manifest: &mut Manifest,
) -> Result<CatalogItem, String>
where
    P: GisPlatform + ?Sized,
{
    let service = platform
        .publish_shapefile(staging, &item.name)
        .map_err(|e| format!("publish failed: {e}"))?;

    manifest.record_published(item.id.as_ref(), &service);

    let definition = ServiceDefinition::editable(request.capabilities.as_deref());
    platform
        .update_service_definition(&service, &definition)
        .map_err(|e| format!("service definition update for {} failed: {e}", service.id))?;

    match platform.add_to_webmap(&request.webmap_id, &service) {
        Ok(true) => Ok(service),
        Ok(false) => Err(format!(
            "adding {} to web map {} was not confirmed",
            service.id, request.webmap_id
        )),
        Err(e) => Err(format!(
            "adding {} to web map {} failed: {e}",
            service.id, request.webmap_id
        )),
    }
}
