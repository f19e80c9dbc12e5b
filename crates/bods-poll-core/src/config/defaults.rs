//! Default values for configuration types.
//!
//! Every optional config field has an accessor here that resolves the
//! configured value or its default.

use crate::config::types::{CsrfConfig, PollConfig, PortalConfig, SessionTimeoutConfig};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://publish.bus-data.dft.gov.uk";
pub const DEFAULT_API_ROOT: &str = "/api/app/";
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_DQS_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_SUCCESS_STATUS: &str = "success";
pub const DEFAULT_CSRF_STRATEGY: &str = "cookie";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_WARNING_SECS: u64 = 120;

impl PortalConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn api_root(&self) -> &str {
        self.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT)
    }
}

impl PollConfig {
    /// Returns the dataset progress interval, defaulting to 10 seconds.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
    }

    /// Returns the DQS status interval, defaulting to 5 seconds.
    pub fn dqs_interval(&self) -> Duration {
        Duration::from_millis(self.dqs_interval_ms.unwrap_or(DEFAULT_DQS_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn sequencing(&self) -> bool {
        self.sequencing.unwrap_or(false)
    }

    pub fn success_statuses(&self) -> Vec<String> {
        self.success_statuses
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_SUCCESS_STATUS.to_string()])
    }
}

impl CsrfConfig {
    pub fn strategy(&self) -> &str {
        self.strategy.as_deref().unwrap_or(DEFAULT_CSRF_STRATEGY)
    }

    pub fn cookie_name(&self) -> &str {
        self.cookie_name.as_deref().unwrap_or(DEFAULT_CSRF_COOKIE)
    }

    pub fn field_name(&self) -> &str {
        self.field_name.as_deref().unwrap_or(DEFAULT_CSRF_FIELD)
    }

    pub fn header_name(&self) -> &str {
        self.header_name.as_deref().unwrap_or(DEFAULT_CSRF_HEADER)
    }

    pub fn form_path(&self) -> &str {
        self.form_path.as_deref().unwrap_or("/")
    }
}

impl SessionTimeoutConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn warning(&self) -> Duration {
        Duration::from_secs(self.warning_secs.unwrap_or(DEFAULT_WARNING_SECS))
    }

    pub fn keep_alive_path(&self) -> &str {
        self.keep_alive_path
            .as_deref()
            .unwrap_or("/account/keep-alive/")
    }

    pub fn logout_path(&self) -> &str {
        self.logout_path.as_deref().unwrap_or("/account/logout/")
    }
}
