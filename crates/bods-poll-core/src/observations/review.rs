//! Suppression posted back to the review page itself.
//!
//! Current review tables POST to a `suppress-observation/` endpoint next to
//! the page rather than to the data host. A single row toggle carries the
//! row's identity; "suppress all" is one request for the whole check.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http::{HttpClient, HttpError};
use crate::page::PageContext;

pub const SUPPRESS_SEGMENT: &str = "suppress-observation/";

/// Toggle for one row of a review table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSuppressRequest {
    pub service_code: String,
    pub line_name: String,
    pub check: String,
    pub is_suppressed: bool,
    /// Suppress a feedback entry instead of an observation result.
    pub is_feedback: bool,
    /// Present on detail pages, where one service line has several rows.
    pub row_id: Option<u64>,
}

/// Toggle for every row of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSuppressRequest {
    pub check: String,
    pub is_suppressed: bool,
    pub is_feedback: bool,
}

impl BulkSuppressRequest {
    /// Build the request a click on the bulk button sends. The button's
    /// current label decides the direction.
    pub fn from_button(check: impl Into<String>, button_label: &str, is_feedback: bool) -> Self {
        Self {
            check: check.into(),
            is_suppressed: bulk_is_suppressed(button_label),
            is_feedback,
        }
    }
}

/// A "Restore all" button restores; anything else suppresses.
pub fn bulk_is_suppressed(button_label: &str) -> bool {
    !button_label.to_lowercase().contains("restore")
}

/// Endpoint for a review page: the page path without its last segment (two
/// on a detail page), followed by `suppress-observation/`. Query and
/// fragment are dropped.
pub fn review_api_url(page_url: &Url, is_detail: bool) -> Url {
    let mut segments: Vec<&str> = page_url.path().trim_end_matches('/').split('/').collect();
    segments.pop();
    if is_detail {
        segments.pop();
    }

    let mut url = page_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.set_path(&format!("{}/{}", segments.join("/"), SUPPRESS_SEGMENT));
    url
}

/// Suppress or restore one row.
pub async fn suppress_row(
    client: &HttpClient,
    page: &PageContext,
    is_detail: bool,
    request: &RowSuppressRequest,
) -> Result<serde_json::Value, HttpError> {
    info!(
        event = "core.observations.row_suppress_started",
        service_code = %request.service_code,
        line_name = %request.line_name,
        is_suppressed = request.is_suppressed,
        is_feedback = request.is_feedback
    );
    let response = post_to_page(client, page, is_detail, request).await?;
    info!(
        event = "core.observations.row_suppress_completed",
        service_code = %request.service_code,
        is_suppressed = request.is_suppressed
    );
    Ok(response)
}

/// Suppress or restore every row of a check with one request.
pub async fn suppress_check(
    client: &HttpClient,
    page: &PageContext,
    is_detail: bool,
    request: &BulkSuppressRequest,
) -> Result<serde_json::Value, HttpError> {
    info!(
        event = "core.observations.bulk_suppress_started",
        check = %request.check,
        is_suppressed = request.is_suppressed,
        is_feedback = request.is_feedback
    );
    let response = post_to_page(client, page, is_detail, request).await?;
    info!(
        event = "core.observations.bulk_suppress_completed",
        check = %request.check,
        is_suppressed = request.is_suppressed
    );
    Ok(response)
}

async fn post_to_page<T: Serialize>(
    client: &HttpClient,
    page: &PageContext,
    is_detail: bool,
    body: &T,
) -> Result<serde_json::Value, HttpError> {
    let target = review_api_url(page.url(), is_detail);

    let mut origin = target.clone();
    origin.set_path("/");
    let page_client = client.for_origin(origin);

    let body = serde_json::to_value(body).map_err(|e| HttpError::Decode {
        message: e.to_string(),
    })?;
    page_client.post_json(target.as_str(), &body).await
}
