//! Wire shapes of the ArcGIS REST responses the client reads.
//!
//! Only the fields the driver needs are modelled; everything else is ignored.

use serde::Deserialize;

use agol_core::{CatalogItem, ItemId};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelfResponse {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ItemResponse>,
    /// `-1` once the last page has been returned.
    #[serde(default = "last_page")]
    pub next_start: i64,
}

fn last_page() -> i64 {
    -1
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemResponse {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl From<ItemResponse> for CatalogItem {
    fn from(item: ItemResponse) -> Self {
        CatalogItem {
            id: ItemId(item.id),
            title: item.title,
            url: item.url.filter(|u| !u.is_empty()),
            owner: item.owner,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddItemResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishResponse {
    #[serde(default)]
    pub services: Vec<PublishedService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublishedService {
    #[serde(default)]
    pub service_item_id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportResponse {
    pub export_item_id: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobStatusResponse {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceInfo {
    #[serde(default)]
    pub layers: Vec<LayerInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LayerInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}
