use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{
    BulkCreateRequest, CreateUrlRequest, LinkAnalytics, LinkRecord, LinkSummary, NewLink, Validity,
};
use crate::store::{LinkStore, StoreError};

pub struct AppState {
    pub store: Arc<LinkStore>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            message: message.into(),
        }),
    )
}

/// Map a store failure to its HTTP status
pub fn store_error(err: &StoreError) -> ApiError {
    let status = match err {
        StoreError::InvalidUrl
        | StoreError::InvalidShortcodeFormat
        | StoreError::InvalidValidity => StatusCode::BAD_REQUEST,
        StoreError::ShortcodeCollision => StatusCode::CONFLICT,
        StoreError::NotFound | StoreError::Expired => StatusCode::NOT_FOUND,
        StoreError::StoreExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    api_error(status, err.to_string())
}

/// A newly created link as reported to API callers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLink {
    pub shortcode: String,
    pub short_link: String,
    pub original_url: String,
    pub custom_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub never_expires: bool,
    pub validity: Validity,
}

impl CreatedLink {
    fn new(record: LinkRecord, config: &Config) -> Self {
        Self {
            short_link: config.short_link(&record.shortcode),
            never_expires: record.never_expires(),
            shortcode: record.shortcode,
            original_url: record.original_url,
            custom_name: record.custom_name,
            created_at: record.created_at,
            expires_at: record.expires_at,
            validity: record.validity,
        }
    }
}

/// A link in list and top-N views
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListItem {
    #[serde(flatten)]
    pub summary: LinkSummary,
    pub short_link: String,
    pub never_expires: bool,
}

impl LinkListItem {
    pub fn new(summary: LinkSummary, config: &Config) -> Self {
        Self {
            short_link: config.short_link(&summary.record.shortcode),
            never_expires: summary.record.never_expires(),
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuccess {
    pub index: usize,
    pub success: bool,
    #[serde(flatten)]
    pub link: CreatedLink,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub index: usize,
    pub success: bool,
    pub original_url: Option<String>,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BulkItemResult {
    Created(BulkSuccess),
    Failed(BulkFailure),
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub success: bool,
    pub results: Vec<BulkItemResult>,
    pub successful: usize,
    pub failed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Validate a request and create the link
fn create_link(state: &AppState, payload: CreateUrlRequest) -> Result<CreatedLink, ApiError> {
    let Some(url) = payload.url.filter(|u| !u.trim().is_empty()) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing required field: url",
        ));
    };

    let validity = Validity::from_json(
        payload.validity.as_ref(),
        state.config.api.default_validity(),
    )
    .map_err(|e| store_error(&e))?;

    let new_link = NewLink {
        original_url: url,
        validity,
        custom_shortcode: payload.custom_code,
        custom_name: payload.custom_name,
    };

    let record = state
        .store
        .create_short_url(new_link)
        .map_err(|e| store_error(&e))?;

    Ok(CreatedLink::new(record, &state.config))
}

/// Create a new short link
pub async fn create_url(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreatedLink>), ApiError> {
    match create_link(&state, payload) {
        Ok(link) => Ok((StatusCode::CREATED, Json(link))),
        Err(err) => {
            warn!(status = %err.0, message = %err.1.message, "failed to create short URL");
            Err(err)
        }
    }
}

/// Create many short links; each item succeeds or fails on its own
pub async fn bulk_create_urls(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BulkCreateRequest>,
) -> Result<(StatusCode, Json<BulkCreateResponse>), ApiError> {
    let items = payload.urls.unwrap_or_default();
    if items.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "URLs array is required"));
    }

    let max_items = state.config.api.max_bulk_items;
    if items.len() > max_items {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("At most {max_items} URLs can be created per request"),
        ));
    }

    info!(count = items.len(), "creating bulk short URLs");

    let total = items.len();
    let results: Vec<BulkItemResult> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let request = match CreateUrlRequest::from_bulk_item(item) {
                Ok(request) => request,
                Err(err) => {
                    return BulkItemResult::Failed(BulkFailure {
                        index,
                        success: false,
                        original_url: None,
                        error: format!("Malformed item: {err}"),
                    })
                }
            };

            let original_url = request.url.clone();
            match create_link(&state, request) {
                Ok(link) => BulkItemResult::Created(BulkSuccess {
                    index,
                    success: true,
                    link,
                }),
                Err((_, Json(err))) => BulkItemResult::Failed(BulkFailure {
                    index,
                    success: false,
                    original_url,
                    error: err.message,
                }),
            }
        })
        .collect();

    let successful = results
        .iter()
        .filter(|r| matches!(r, BulkItemResult::Created(_)))
        .count();
    let failed = total - successful;

    info!(successful, failed, "bulk short URLs created");

    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse {
            success: true,
            results,
            successful,
            failed,
            total,
        }),
    ))
}

/// List all short links in creation order
pub async fn list_urls(State(state): State<Arc<AppState>>) -> Json<Vec<LinkListItem>> {
    let items = state
        .store
        .get_all_urls()
        .into_iter()
        .map(|summary| LinkListItem::new(summary, &state.config))
        .collect();
    Json(items)
}

/// Delete a short link and its click history
pub async fn delete_url(
    State(state): State<Arc<AppState>>,
    Path(shortcode): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if !state.store.delete_url(&shortcode) {
        warn!(shortcode = %shortcode, "shortcode not found for deletion");
        return Err(api_error(StatusCode::NOT_FOUND, "Shortcode not found"));
    }

    Ok(Json(SuccessResponse {
        success: true,
        message: "URL deleted successfully".to_string(),
    }))
}

/// Click history for one link, including expired links
pub async fn get_url_analytics(
    State(state): State<Arc<AppState>>,
    Path(shortcode): Path<String>,
) -> Result<Json<LinkAnalytics>, ApiError> {
    state
        .store
        .get_analytics(&shortcode)
        .map(Json)
        .ok_or_else(|| store_error(&StoreError::NotFound))
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
