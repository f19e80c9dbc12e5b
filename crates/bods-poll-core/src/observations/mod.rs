//! Observation suppression on the PTI/DQS review tables.
//!
//! Publishers can suppress an observation for one service line. Older
//! tables send each toggle to the data host's app API, one row at a time.
//! Current review pages post to an endpoint beside the page; see [`review`].

pub mod review;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::http::{HttpClient, HttpError};

pub use review::{
    BulkSuppressRequest, RowSuppressRequest, bulk_is_suppressed, review_api_url, suppress_check,
    suppress_row,
};

pub const SUPPRESS_PATH: &str = "/api/app/suppress_observation/suppress/";

/// Which report and check a row belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationScope {
    pub organisation_id: u64,
    pub revision_id: u64,
    pub report_id: u64,
    pub check: String,
}

/// One service line row in the observation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRow {
    pub service_code: String,
    pub line_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressObservationRequest {
    pub report_id: u64,
    pub revision_id: u64,
    pub organisation_id: u64,
    pub service_code: String,
    pub line_name: String,
    pub check: String,
    pub is_suppressed: bool,
}

impl SuppressObservationRequest {
    pub fn new(scope: &ObservationScope, row: &ObservationRow, is_suppressed: bool) -> Self {
        Self {
            report_id: scope.report_id,
            revision_id: scope.revision_id,
            organisation_id: scope.organisation_id,
            service_code: row.service_code.clone(),
            line_name: row.line_name.clone(),
            check: scope.check.clone(),
            is_suppressed,
        }
    }
}

/// Label shown in a row once its checkbox changes.
pub fn row_label(is_suppressed: bool) -> &'static str {
    if is_suppressed { "Suppressed" } else { "Suppress" }
}

/// Label of the bulk button, given every row's checkbox state.
pub fn bulk_button_label(suppressed: &[bool]) -> &'static str {
    if !suppressed.is_empty() && suppressed.iter().all(|s| *s) {
        "Restore all observations"
    } else {
        "Suppress all observations"
    }
}

/// The data host for a publish-host URL (`publish.` becomes `data.`).
pub fn data_host_url(publish_url: &Url) -> Result<Url, HttpError> {
    let host = publish_url.host_str().ok_or_else(|| HttpError::InvalidUrl {
        url: publish_url.to_string(),
        message: "URL has no host".to_string(),
    })?;

    let mut url = publish_url.clone();
    url.set_path("/");
    url.set_query(None);
    url.set_host(Some(&host.replacen("publish", "data", 1)))
        .map_err(|e| HttpError::InvalidUrl {
            url: publish_url.to_string(),
            message: e.to_string(),
        })?;
    Ok(url)
}

/// Suppress or restore one observation.
pub async fn suppress_observation(
    client: &HttpClient,
    request: &SuppressObservationRequest,
) -> Result<serde_json::Value, HttpError> {
    let data_client = client.for_origin(data_host_url(client.base_url())?);

    info!(
        event = "core.observations.suppress_started",
        service_code = %request.service_code,
        line_name = %request.line_name,
        check = %request.check,
        is_suppressed = request.is_suppressed
    );

    let body = serde_json::to_value(request).map_err(|e| HttpError::Decode {
        message: e.to_string(),
    })?;
    let response = data_client.post_json(SUPPRESS_PATH, &body).await?;

    info!(
        event = "core.observations.suppress_completed",
        service_code = %request.service_code,
        is_suppressed = request.is_suppressed
    );
    Ok(response)
}

/// Apply the same suppression state to every row, one request per row.
///
/// Failures are collected rather than aborting the batch.
pub async fn suppress_all(
    client: &HttpClient,
    scope: &ObservationScope,
    rows: &[ObservationRow],
    is_suppressed: bool,
) -> Vec<(ObservationRow, Result<serde_json::Value, HttpError>)> {
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let request = SuppressObservationRequest::new(scope, row, is_suppressed);
        let result = suppress_observation(client, &request).await;
        if let Err(e) = &result {
            warn!(
                event = "core.observations.suppress_failed",
                service_code = %row.service_code,
                line_name = %row.line_name,
                error = %e
            );
        }
        results.push((row.clone(), result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::test_server::{response, serve};
    use crate::http::{CsrfToken, HttpClientSettings};

    fn scope() -> ObservationScope {
        ObservationScope {
            organisation_id: 1,
            revision_id: 2,
            report_id: 3,
            check: "Missing journey code".to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let row = ObservationRow {
            service_code: "PB0000582:1".to_string(),
            line_name: "12A".to_string(),
        };
        let json =
            serde_json::to_value(SuppressObservationRequest::new(&scope(), &row, true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "report_id": 3,
                "revision_id": 2,
                "organisation_id": 1,
                "service_code": "PB0000582:1",
                "line_name": "12A",
                "check": "Missing journey code",
                "is_suppressed": true,
            })
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(row_label(true), "Suppressed");
        assert_eq!(row_label(false), "Suppress");
        assert_eq!(bulk_button_label(&[true, true]), "Restore all observations");
        assert_eq!(bulk_button_label(&[true, false]), "Suppress all observations");
        assert_eq!(bulk_button_label(&[]), "Suppress all observations");
    }

    #[test]
    fn test_data_host_url() {
        let publish = Url::parse("https://publish.bus-data.dft.gov.uk/org/1/?tab=active").unwrap();
        assert_eq!(
            data_host_url(&publish).unwrap().as_str(),
            "https://data.bus-data.dft.gov.uk/"
        );

        let local = Url::parse("http://localhost:8000/").unwrap();
        assert_eq!(data_host_url(&local).unwrap().as_str(), "http://localhost:8000/");
    }

    #[tokio::test]
    async fn test_suppress_observation_posts_to_data_host() {
        // localhost has no "publish" label, so the data host is the same server.
        let (base, server) = serve(vec![response("200 OK", r#"{"suppressed": true}"#)]).await;
        let client = HttpClient::new(HttpClientSettings {
            base_url: base,
            cookie: Some("csrftoken=tok".to_string()),
            csrf_header: "X-CSRFToken".to_string(),
            timeout: None,
        })
        .unwrap()
        .with_csrf_token(CsrfToken::new("tok"));

        let row = ObservationRow {
            service_code: "PB1".to_string(),
            line_name: "1".to_string(),
        };
        let results = suppress_all(&client, &scope(), &[row], true).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1.as_ref().unwrap()["suppressed"], true);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /api/app/suppress_observation/suppress/ HTTP/1.1"));
        assert!(requests[0].contains(r#""is_suppressed":true"#));
    }
}
