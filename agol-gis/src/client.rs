//! Blocking ArcGIS REST client.
//!
//! Every call is a single synchronous HTTP request (publish and export also
//! poll their job status until it settles). Responses carrying an `error`
//! object are turned into [`PlatformError::Api`] even when the HTTP status
//! is 200, which is how the sharing API reports most failures.

use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use agol_core::{
    CatalogItem, Credentials, GisPlatform, ItemId, PlatformError, ServiceDefinition,
};

use crate::responses::{
    AddItemResponse, ApiError, ExportResponse, ItemResponse, JobStatusResponse, PublishResponse,
    SearchResponse, SelfResponse, ServiceInfo, SuccessResponse, TokenResponse,
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Transport and scoping options for [`ArcGisClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Portal root, e.g. `https://www.arcgis.com`.
    pub base_url: String,
    /// Restrict the catalog search to a group instead of the signed-in owner.
    pub group: Option<String>,
    /// Referer the token is bound to.
    pub referer: String,
    pub token_expiration_minutes: u32,
    pub job_poll_interval: Duration,
    pub job_poll_attempts: u32,
    pub request_timeout: Duration,
    /// Upper bound for a single item download, which may run far longer than
    /// an API call.
    pub transfer_timeout: Duration,
    pub page_size: u32,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "https://www.arcgis.com".to_string(),
            group: None,
            referer: "agol-driver".to_string(),
            token_expiration_minutes: 60,
            job_poll_interval: Duration::from_secs(2),
            job_poll_attempts: 150,
            request_timeout: Duration::from_secs(300),
            transfer_timeout: Duration::from_secs(3600),
            page_size: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An authenticated ArcGIS Online / Enterprise session.
#[derive(Debug)]
pub struct ArcGisClient {
    http: Client,
    options: ClientOptions,
    /// `<base_url>/sharing/rest`
    rest: String,
    token: String,
    username: String,
}

impl ArcGisClient {
    /// Exchange `credentials` for a token and resolve the signed-in user.
    pub fn connect(options: ClientOptions, credentials: &Credentials) -> Result<Self, PlatformError> {
        let rest = format!("{}/sharing/rest", options.base_url.trim_end_matches('/'));
        let http = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| http_error(&rest, e))?;

        let token_url = format!("{rest}/generateToken");
        let expiration = options.token_expiration_minutes.to_string();
        tracing::debug!("POST {token_url}");
        let response = http
            .post(&token_url)
            .form(&[
                ("username", credentials.user.as_str()),
                ("password", credentials.pass.as_str()),
                ("client", "referer"),
                ("referer", options.referer.as_str()),
                ("expiration", expiration.as_str()),
                ("f", "json"),
            ])
            .send()
            .map_err(|e| http_error(&token_url, e))?;
        let TokenResponse { token } = decode(&token_url, response)?;

        let mut client = Self {
            http,
            options,
            rest,
            token,
            username: String::new(),
        };
        let self_url = format!("{}/community/self", client.rest);
        let SelfResponse { username } = client.get_json(&self_url, &[])?;
        tracing::info!("signed in to {} as {username}", client.options.base_url);
        client.username = username;
        Ok(client)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Search expression scoping the catalog to one owner or one group.
    pub fn search_query(&self) -> String {
        match &self.options.group {
            Some(group) => format!("group:{group} type:\"Feature Service\""),
            None => format!("owner:{} type:\"Feature Service\"", self.username),
        }
    }

    // -- transport helpers ---------------------------------------------------

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        tracing::debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("f", "json"), ("token", self.token.as_str())])
            .send()
            .map_err(|e| http_error(url, e))?;
        decode(url, response)
    }

    fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("f", "json"));
        form.push(("token", self.token.as_str()));
        tracing::debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .map_err(|e| http_error(url, e))?;
        decode(url, response)
    }

    fn user_content(&self, owner: &str) -> String {
        format!("{}/content/users/{owner}", self.rest)
    }

    fn owner_of(&self, id: &ItemId) -> Result<String, PlatformError> {
        let item = self.get_item(id)?;
        Ok(item.owner.unwrap_or_else(|| self.username.clone()))
    }

    /// Poll a publish/export job until it completes or fails.
    fn wait_for_job(
        &self,
        owner: &str,
        item: &ItemId,
        job_id: &str,
        job_type: &str,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/items/{item}/status", self.user_content(owner));
        let mut last = String::from("not started");
        for attempt in 1..=self.options.job_poll_attempts {
            let status: JobStatusResponse =
                self.get_json(&url, &[("jobId", job_id), ("jobType", job_type)])?;
            match status.status.as_str() {
                "completed" => return Ok(()),
                "failed" => {
                    return Err(PlatformError::JobFailed {
                        job: job_type.to_string(),
                        id: item.clone(),
                        status: status
                            .status_message
                            .map(|m| format!("failed: {m}"))
                            .unwrap_or(status.status),
                    })
                }
                other => {
                    tracing::debug!("{job_type} job {job_id} is {other} (poll {attempt})");
                    last = other.to_string();
                    sleep(self.options.job_poll_interval);
                }
            }
        }
        Err(PlatformError::JobFailed {
            job: job_type.to_string(),
            id: item.clone(),
            status: last,
        })
    }

    fn service_url<'a>(&self, service: &'a CatalogItem) -> Result<&'a str, PlatformError> {
        service.url.as_deref().ok_or_else(|| PlatformError::Response {
            endpoint: format!("{}/content/items/{}", self.rest, service.id),
            message: "feature service has no service url".to_string(),
        })
    }

    /// Operational-layer entries for every layer of `service`.
    fn operational_layers(&self, service: &CatalogItem) -> Result<Vec<Value>, PlatformError> {
        let url = self.service_url(service)?;
        let info: ServiceInfo = self.get_json(url, &[])?;
        if info.layers.is_empty() {
            return Ok(vec![json!({
                "id": service.id.as_str(),
                "title": service.title,
                "url": url,
                "itemId": service.id.as_str(),
                "layerType": "ArcGISFeatureLayer",
                "visibility": true,
                "opacity": 1,
            })]);
        }
        Ok(info
            .layers
            .iter()
            .map(|layer| {
                let title = if layer.name.is_empty() {
                    &service.title
                } else {
                    &layer.name
                };
                json!({
                    "id": format!("{}_{}", service.id, layer.id),
                    "title": title,
                    "url": format!("{url}/{}", layer.id),
                    "itemId": service.id.as_str(),
                    "layerType": "ArcGISFeatureLayer",
                    "visibility": true,
                    "opacity": 1,
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// GisPlatform
// ---------------------------------------------------------------------------

impl GisPlatform for ArcGisClient {
    fn search_feature_services(&self) -> Result<Vec<CatalogItem>, PlatformError> {
        let url = format!("{}/search", self.rest);
        let query = self.search_query();
        let num = self.options.page_size.to_string();
        let mut start: i64 = 1;
        let mut items = Vec::new();
        loop {
            let start_param = start.to_string();
            let page: SearchResponse = self.get_json(
                &url,
                &[
                    ("q", query.as_str()),
                    ("num", num.as_str()),
                    ("start", start_param.as_str()),
                ],
            )?;
            items.extend(page.results.into_iter().map(CatalogItem::from));
            if page.next_start <= 0 || page.next_start <= start {
                break;
            }
            start = page.next_start;
        }
        tracing::info!("found {} feature services for {query}", items.len());
        Ok(items)
    }

    fn get_item(&self, id: &ItemId) -> Result<CatalogItem, PlatformError> {
        let url = format!("{}/content/items/{id}", self.rest);
        match self.get_json::<ItemResponse>(&url, &[]) {
            Ok(item) => Ok(item.into()),
            Err(PlatformError::Api { code, message, .. })
                if code == 404 || message.contains("not exist") =>
            {
                Err(PlatformError::NotFound { id: id.clone() })
            }
            Err(e) => Err(e),
        }
    }

    fn add_shapefile(&self, title: &str, path: &Path) -> Result<ItemId, PlatformError> {
        let url = format!("{}/addItem", self.user_content(&self.username));
        let form = multipart::Form::new()
            .text("type", "Shapefile")
            .text("title", title.to_string())
            .text("overwrite", "true")
            .text("f", "json")
            .text("token", self.token.clone())
            .file("file", path)
            .map_err(|e| PlatformError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        tracing::debug!("POST {url} ({})", path.display());
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| http_error(&url, e))?;
        let added: AddItemResponse = decode(&url, response)?;
        match added.id {
            Some(id) if added.success => Ok(ItemId(id)),
            _ => Err(PlatformError::Response {
                endpoint: url,
                message: "addItem did not report success".to_string(),
            }),
        }
    }

    fn delete_item(&self, id: &ItemId) -> Result<bool, PlatformError> {
        let owner = self.owner_of(id)?;
        let url = format!("{}/items/{id}/delete", self.user_content(&owner));
        let resp: SuccessResponse = self.post_form(&url, &[])?;
        Ok(resp.success)
    }

    fn publish_shapefile(&self, staging: &ItemId, name: &str) -> Result<CatalogItem, PlatformError> {
        let url = format!("{}/publish", self.user_content(&self.username));
        let parameters = json!({ "name": name }).to_string();
        let resp: PublishResponse = self.post_form(
            &url,
            &[
                ("itemid", staging.as_str()),
                ("filetype", "shapefile"),
                ("publishParameters", parameters.as_str()),
            ],
        )?;

        let Some(service) = resp.services.into_iter().next() else {
            return Err(PlatformError::Response {
                endpoint: url,
                message: "publish returned no services".to_string(),
            });
        };
        if let Some(err) = service.error {
            return Err(api_error(&url, err));
        }
        let service_id = match service.service_item_id {
            Some(id) if service.success != Some(false) => ItemId(id),
            _ => {
                return Err(PlatformError::Response {
                    endpoint: url,
                    message: "publish did not report success".to_string(),
                })
            }
        };
        if let Some(job_id) = service.job_id.as_deref() {
            self.wait_for_job(&self.username, &service_id, job_id, "publish")?;
        }
        self.get_item(&service_id)
    }

    fn update_service_definition(
        &self,
        service: &CatalogItem,
        definition: &ServiceDefinition,
    ) -> Result<(), PlatformError> {
        let url = format!("{}/updateDefinition", admin_url(self.service_url(service)?));
        let body = serde_json::to_string(definition).map_err(|e| PlatformError::Response {
            endpoint: url.clone(),
            message: e.to_string(),
        })?;
        let resp: SuccessResponse = self.post_form(&url, &[("updateDefinition", body.as_str())])?;
        if resp.success {
            Ok(())
        } else {
            Err(PlatformError::Response {
                endpoint: url,
                message: "updateDefinition did not report success".to_string(),
            })
        }
    }

    fn add_to_webmap(&self, webmap: &ItemId, service: &CatalogItem) -> Result<bool, PlatformError> {
        let data_url = format!("{}/content/items/{webmap}/data", self.rest);
        let mut data: Value = self.get_json(&data_url, &[])?;
        if data.is_null() {
            data = json!({});
        }
        let layers = self.operational_layers(service)?;
        let Some(map) = data.as_object_mut() else {
            return Err(PlatformError::Response {
                endpoint: data_url,
                message: "web map data is not a JSON object".to_string(),
            });
        };
        match map
            .entry("operationalLayers")
            .or_insert_with(|| json!([]))
            .as_array_mut()
        {
            Some(existing) => existing.extend(layers),
            None => {
                return Err(PlatformError::Response {
                    endpoint: data_url,
                    message: "operationalLayers is not a list".to_string(),
                })
            }
        }

        let owner = self.owner_of(webmap)?;
        let url = format!("{}/items/{webmap}/update", self.user_content(&owner));
        let text = data.to_string();
        let resp: SuccessResponse = self.post_form(&url, &[("text", text.as_str())])?;
        Ok(resp.success)
    }

    fn export_item(&self, id: &ItemId, title: &str, format: &str) -> Result<ItemId, PlatformError> {
        let url = format!("{}/export", self.user_content(&self.username));
        let resp: ExportResponse = self.post_form(
            &url,
            &[
                ("itemId", id.as_str()),
                ("exportFormat", format),
                ("title", title),
            ],
        )?;
        let export_id = ItemId(resp.export_item_id);
        if let Some(job_id) = resp.job_id.as_deref() {
            self.wait_for_job(&self.username, &export_id, job_id, "export")?;
        }
        Ok(export_id)
    }

    fn download_item(&self, id: &ItemId, dest: &Path) -> Result<(), PlatformError> {
        let url = format!("{}/content/items/{id}/data", self.rest);
        tracing::debug!("GET {url} -> {}", dest.display());
        let mut response = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .timeout(self.options.transfer_timeout)
            .send()
            .map_err(|e| http_error(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Http {
                endpoint: url,
                message: format!("status {status}"),
            });
        }
        let io = |source: std::io::Error| PlatformError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let mut file = std::fs::File::create(dest).map_err(io)?;
        let written = response
            .copy_to(&mut file)
            .map_err(|e| http_error(&url, e))?;
        file.sync_all().map_err(io)?;
        tracing::debug!("wrote {written} bytes to {}", dest.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn http_error(endpoint: &str, err: reqwest::Error) -> PlatformError {
    PlatformError::Http {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

fn api_error(endpoint: &str, err: ApiError) -> PlatformError {
    let message = if err.details.is_empty() {
        err.message
    } else {
        format!("{} ({})", err.message, err.details.join("; "))
    };
    PlatformError::Api {
        endpoint: endpoint.to_string(),
        code: err.code,
        message,
    }
}

/// Check the status, surface an `error` object, then decode `T`.
fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, PlatformError> {
    let status = response.status();
    let body = response.text().map_err(|e| http_error(endpoint, e))?;
    if !status.is_success() {
        return Err(PlatformError::Http {
            endpoint: endpoint.to_string(),
            message: format!("status {status}: {}", body.chars().take(200).collect::<String>()),
        });
    }
    let value: Value = serde_json::from_str(&body).map_err(|e| PlatformError::Response {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })?;
    if let Some(err) = value.get("error") {
        let err: ApiError = serde_json::from_value(err.clone()).unwrap_or(ApiError {
            code: 0,
            message: err.to_string(),
            details: vec![],
        });
        return Err(api_error(endpoint, err));
    }
    serde_json::from_value(value).map_err(|e| PlatformError::Response {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// `.../rest/services/<name>/FeatureServer` → `.../rest/admin/services/<name>/FeatureServer`
fn admin_url(service_url: &str) -> String {
    service_url
        .trim_end_matches('/')
        .replacen("/rest/services/", "/rest/admin/services/", 1)
}
