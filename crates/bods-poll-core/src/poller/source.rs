use std::future::Future;

use crate::http::{HttpClient, HttpError};

/// Where a session reads its status from.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<serde_json::Value, HttpError>> + Send;
}

impl StatusSource for HttpClient {
    fn fetch(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<serde_json::Value, HttpError>> + Send {
        self.get_json(endpoint)
    }
}
