//! HTTP client for the listing marketplace API.
//!
//! Covers the read-only lookup lists that feed the selection screens, the
//! listing detail used by edit mode, and the create, update and publish
//! endpoints that consume a flattened draft.

mod error;
pub mod outcome;
pub mod payload;

pub use error::ApiError;
pub use outcome::{Prompt, SubmissionOutcome, SubmissionResponse, SubmitAction};

use crate::draft::{Category, Draft};
use crate::resolver::{Attribute, LookupEntity};
use log::*;
use reqwest::{Method, Response, Url};
use std::fmt;
use std::str::FromStr;

/// Specifying the lookup lists served by the API.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Brands,
    Names,
    Transmissions,
    FuelTypes,
    Colors,
    Ownerships,
    Years,
    BikeTypes,
    SpareConditions,
    SpareProductTypes,
    SpareSubProductTypes,
    SpareBrands,
    SpareModels,
}

impl LookupKind {
    pub const ALL: [LookupKind; 13] = [
        LookupKind::Brands,
        LookupKind::Names,
        LookupKind::Transmissions,
        LookupKind::FuelTypes,
        LookupKind::Colors,
        LookupKind::Ownerships,
        LookupKind::Years,
        LookupKind::BikeTypes,
        LookupKind::SpareConditions,
        LookupKind::SpareProductTypes,
        LookupKind::SpareSubProductTypes,
        LookupKind::SpareBrands,
        LookupKind::SpareModels,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LookupKind::Brands => "brands",
            LookupKind::Names => "names",
            LookupKind::Transmissions => "transmissions",
            LookupKind::FuelTypes => "fuel-types",
            LookupKind::Colors => "colors",
            LookupKind::Ownerships => "ownerships",
            LookupKind::Years => "years",
            LookupKind::BikeTypes => "bike-types",
            LookupKind::SpareConditions => "spare-conditions",
            LookupKind::SpareProductTypes => "spare-product-types",
            LookupKind::SpareSubProductTypes => "spare-sub-product-types",
            LookupKind::SpareBrands => "spare-brands",
            LookupKind::SpareModels => "spare-models",
        }
    }

    /// Returns the path of the list endpoint.
    ///
    pub fn endpoint(&self) -> &'static str {
        match self {
            LookupKind::Brands => "carandbike/brand/list",
            LookupKind::Names => "carandbike/name/list",
            LookupKind::Transmissions => "carandbike/transmission/list",
            LookupKind::FuelTypes => "carandbike/fueltype/list",
            LookupKind::Colors => "carandbike/color/list",
            LookupKind::Ownerships => "carandbike/ownership/list",
            LookupKind::Years => "carandbike/year/list",
            LookupKind::BikeTypes => "carandbike/biketype/list",
            LookupKind::SpareConditions => "spare/condition/list",
            LookupKind::SpareProductTypes => "spare/producttype/list",
            LookupKind::SpareSubProductTypes => "spare/subproducttype/list",
            LookupKind::SpareBrands => "spare/brand/list",
            LookupKind::SpareModels => "spare/model/list",
        }
    }

    /// Returns the key under `data` that holds the entity list.
    ///
    pub fn list_key(&self) -> &'static str {
        match self {
            LookupKind::Brands | LookupKind::SpareBrands => "brands",
            LookupKind::Names => "names",
            LookupKind::Transmissions => "transmissions",
            LookupKind::FuelTypes => "fuelTypes",
            LookupKind::Colors => "colors",
            LookupKind::Ownerships => "ownerships",
            LookupKind::Years => "years",
            LookupKind::BikeTypes => "bikeTypes",
            LookupKind::SpareConditions => "conditions",
            LookupKind::SpareProductTypes => "productTypes",
            LookupKind::SpareSubProductTypes => "subProductTypes",
            LookupKind::SpareModels => "models",
        }
    }

    pub fn for_attribute(attribute: Attribute) -> LookupKind {
        match attribute {
            Attribute::Brand => LookupKind::Brands,
            Attribute::Name => LookupKind::Names,
            Attribute::Transmission => LookupKind::Transmissions,
            Attribute::FuelType => LookupKind::FuelTypes,
            Attribute::Color => LookupKind::Colors,
            Attribute::Ownership => LookupKind::Ownerships,
            Attribute::Year => LookupKind::Years,
            Attribute::BikeType => LookupKind::BikeTypes,
            Attribute::SpareCondition => LookupKind::SpareConditions,
            Attribute::SpareProductType => LookupKind::SpareProductTypes,
            Attribute::SpareSubProductType => LookupKind::SpareSubProductTypes,
            Attribute::SpareBrand => LookupKind::SpareBrands,
            Attribute::SpareModel => LookupKind::SpareModels,
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LookupKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LookupKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| ApiError::UnknownLookup(s.to_string()))
    }
}

/// Returns the resource path segment for a category's listings.
///
fn resource(category: Category) -> &'static str {
    match category {
        Category::Car | Category::Bike => "carandbike",
        Category::Spare => "spare",
    }
}

/// Makes requests to the listing API and conforms response data to the
/// draft and lookup types.
///
#[derive(Clone)]
pub struct Client {
    access_token: String,
    base_url: Url,
    http_client: reqwest::Client,
}

impl Client {
    /// Returns a new instance for the given access token and base URL.
    ///
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        Ok(Client {
            access_token: access_token.to_owned(),
            base_url: parsed,
            http_client: reqwest::Client::builder().build()?,
        })
    }

    /// Return every entity of a lookup list, following `pagination.totalPages`.
    ///
    pub async fn lookups(
        &self,
        kind: LookupKind,
        params: &[(&str, &str)],
    ) -> Result<Vec<LookupEntity>, ApiError> {
        let mut all_data = Vec::new();
        let mut page: u64 = 1;
        let segments: Vec<&str> = kind.endpoint().split('/').collect();

        loop {
            let page_param = page.to_string();
            let mut page_params: Vec<(&str, &str)> = params.to_vec();
            page_params.push(("page", page_param.as_str()));

            let response = self
                .call(Method::GET, &segments, &page_params, None)
                .await?;
            let body = Self::checked_json(response).await?;

            if !body.get("success").and_then(|s| s.as_bool()).unwrap_or(false) {
                let message = Self::message(&body);
                error!("Lookup {} failed: {}", kind, message);
                return Err(ApiError::Unsuccessful {
                    endpoint: kind.endpoint().to_string(),
                    message,
                });
            }

            let entities = match body.get("data").and_then(|d| d.get(kind.list_key())) {
                Some(list) => serde_json::from_value::<Vec<LookupEntity>>(list.clone())?,
                None => {
                    warn!(
                        "Lookup {} response missing 'data.{}', returning collected data",
                        kind,
                        kind.list_key()
                    );
                    break;
                }
            };
            let page_size = entities.len();
            all_data.extend(entities);

            debug!(
                "Fetched {} page {}: {} items (total so far: {})",
                kind,
                page,
                page_size,
                all_data.len()
            );

            let total_pages = body
                .get("pagination")
                .and_then(|p| p.get("totalPages"))
                .and_then(|t| t.as_u64())
                .unwrap_or(1);
            if page_size == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        debug!(
            "Completed {} fetch: {} total items across {} pages",
            kind,
            all_data.len(),
            page
        );
        Ok(all_data)
    }

    /// Return the stored listing with the given server ID.
    ///
    pub async fn detail(&self, category: Category, id: &str) -> Result<serde_json::Value, ApiError> {
        debug!("Requesting {} listing {}...", category, id);
        let response = self
            .call(Method::GET, &[resource(category), id], &[], None)
            .await?;
        let body = Self::checked_json(response).await?;
        if !body.get("success").and_then(|s| s.as_bool()).unwrap_or(false) {
            return Err(ApiError::Unsuccessful {
                endpoint: format!("{}/{}", resource(category), id),
                message: Self::message(&body),
            });
        }
        Ok(body.get("data").cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Create a new listing from the draft.
    ///
    pub async fn create(&self, draft: &Draft) -> Result<SubmissionResponse, ApiError> {
        info!("Creating {} listing...", draft.category());
        let segments = [resource(draft.category()), "create"];
        self.submit(Method::POST, &segments, Some(payload::build(draft)))
            .await
    }

    /// Update the listing the draft was rehydrated from.
    ///
    pub async fn update(&self, draft: &Draft) -> Result<SubmissionResponse, ApiError> {
        if draft.envelope.product_id.is_empty() {
            return Err(ApiError::MissingProductId);
        }
        info!(
            "Updating {} listing {}...",
            draft.category(),
            draft.envelope.product_id
        );
        let segments = [
            resource(draft.category()),
            "update",
            draft.envelope.product_id.as_str(),
        ];
        self.submit(Method::PUT, &segments, Some(payload::build(draft)))
            .await
    }

    /// Publish a saved listing.
    ///
    pub async fn publish(&self, category: Category, id: &str) -> Result<SubmissionResponse, ApiError> {
        if id.is_empty() {
            return Err(ApiError::MissingProductId);
        }
        info!("Publishing {} listing {}...", category, id);
        self.submit(Method::POST, &[resource(category), "publish", id], None)
            .await
    }

    /// Submission failures still carry an appCode body, so the body is read
    /// before the status is considered.
    ///
    async fn submit(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<SubmissionResponse, ApiError> {
        let path = segments.join("/");
        let response = self.call(method, segments, &[], body).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        match serde_json::from_slice::<SubmissionResponse>(&bytes) {
            Ok(parsed) => {
                debug!(
                    "Submission to {} answered {} (appCode {:?})",
                    path, status, parsed.app_code
                );
                Ok(parsed)
            }
            Err(e) if status.is_success() => {
                error!(
                    "Failed to deserialize submission response: {}. Response body: {}",
                    e,
                    String::from_utf8_lossy(&bytes)
                );
                Err(ApiError::Deserialization(e))
            }
            Err(_) => Err(ApiError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        }
    }

    /// Check status and parse the body as JSON.
    ///
    async fn checked_json(response: Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let response_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unable to read response"));
            error!(
                "API request failed with status {}: {}",
                status, response_text
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: response_text,
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn message(body: &serde_json::Value) -> String {
        body.get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("no message")
            .to_string()
    }

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make request with optional body and return the response.
    ///
    async fn call(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let request_url = self.url(segments)?;
        let mut request = self
            .http_client
            .request(method, request_url)
            .header("Authorization", format!("Bearer {}", &self.access_token));
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(request.send().await?)
    }
}
