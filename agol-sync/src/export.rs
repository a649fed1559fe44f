//! Export workflow: published feature services → shapefiles in object storage.
//!
//! The manifest is never modified by an export.

use agol_core::{ExportItem, ExportRequest, GisPlatform, ObjectStore};

use crate::error::SyncError;
use crate::outcome::{ExportReport, ItemOutcome};
use crate::scratch::ScratchDir;

/// Export every item of `request` and upload the results.
///
/// Any platform or storage failure ends the export; items already uploaded
/// stay uploaded.
pub fn run_export<P, S>(
    platform: &P,
    storage: &S,
    request: &ExportRequest,
    scratch: &ScratchDir,
) -> Result<ExportReport, SyncError>
where
    P: GisPlatform + ?Sized,
    S: ObjectStore + ?Sized,
{
    let mut outcomes = Vec::with_capacity(request.data.len());
    for item in &request.data {
        outcomes.push(export_item(platform, storage, request, item, scratch)?);
    }
    Ok(ExportReport { outcomes })
}

fn export_item<P, S>(
    platform: &P,
    storage: &S,
    request: &ExportRequest,
    item: &ExportItem,
    scratch: &ScratchDir,
) -> Result<ItemOutcome, SyncError>
where
    P: GisPlatform + ?Sized,
    S: ObjectStore + ?Sized,
{
    let service = platform.get_item(&item.id)?;
    // Prepare the destination before anything is created on the platform.
    let local = scratch.clear_stale(&item.file_name())?;
    tracing::info!(
        "exporting {} - {} as {}",
        service.title,
        service.id,
        request.export_format
    );
    let export_id =
        platform.export_item(&service.id, &item.shapefile_name, &request.export_format)?;

    // The transient export item is removed whether or not the download worked.
    let downloaded = platform.download_item(&export_id, &local);
    let deleted = platform.delete_item(&export_id);
    downloaded?;
    if !deleted? {
        tracing::warn!("export item {export_id} delete was not confirmed");
    }

    let key = request.target_key(item);
    storage.upload_file(&request.s3_bucket, &key, &local)?;
    tracing::info!("uploaded {} to s3://{}/{key}", item.name, request.s3_bucket);

    Ok(ItemOutcome::Exported {
        name: item.name.clone(),
        key,
    })
}
