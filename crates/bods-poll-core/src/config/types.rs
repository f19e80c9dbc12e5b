//! Configuration type definitions.
//!
//! These types are serialized/deserialized from TOML config files. Optional
//! fields fall back to the values in [`super::defaults`] through accessor
//! methods, so a missing key and an absent section behave the same way.
//!
//! # Example Configuration
//!
//! ```toml
//! [portal]
//! base_url = "https://publish.bus-data.dft.gov.uk"
//! api_root = "/api/app/"
//!
//! [poll]
//! interval_ms = 10000
//! dqs_interval_ms = 5000
//! sequencing = false
//! success_statuses = ["success"]
//!
//! [csrf]
//! strategy = "field"
//! form_path = "/account/settings/"
//!
//! [session_timeout]
//! timeout_secs = 1800
//! warning_secs = 120
//! ```

use serde::{Deserialize, Serialize};

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BodsConfig {
    /// Portal location and credentials
    #[serde(default)]
    pub portal: PortalConfig,

    /// Poll timing and classification
    #[serde(default)]
    pub poll: PollConfig,

    /// How the CSRF token is discovered and sent back
    #[serde(default)]
    pub csrf: CsrfConfig,

    /// Session timeout countdown
    #[serde(default)]
    pub session_timeout: SessionTimeoutConfig,
}

/// Portal location and credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortalConfig {
    /// Origin every request must share.
    /// Default: `https://publish.bus-data.dft.gov.uk`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path of the internal API, used for DQS status.
    /// Default: `/api/app/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_root: Option<String>,

    /// Raw `Cookie` header sent with every request (session credentials).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

/// Poll timing and classification.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PollConfig {
    /// Interval between dataset progress reads.
    /// Default: 10000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,

    /// Interval between DQS status reads.
    /// Default: 5000ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dqs_interval_ms: Option<u64>,

    /// Per-request timeout. Unset means a request may hang indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Drop responses that were issued before the newest applied response.
    /// Default: false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencing: Option<bool>,

    /// Status strings treated as a successful finish.
    /// Default: `["success"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_statuses: Option<Vec<String>>,
}

/// CSRF token discovery.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CsrfConfig {
    /// Either `cookie` or `field`.
    /// Default: `cookie`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,

    /// Cookie carrying the token.
    /// Default: `csrftoken`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_name: Option<String>,

    /// Hidden form input carrying the token.
    /// Default: `csrfmiddlewaretoken`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,

    /// Request header the token is sent in.
    /// Default: `X-CSRFToken`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,

    /// Page scraped for the hidden field when `strategy = "field"`.
    /// Default: `/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_path: Option<String>,
}

/// Session timeout countdown.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionTimeoutConfig {
    /// Seconds of inactivity before the session expires.
    /// Default: 1800.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Seconds before expiry at which the warning is shown.
    /// Default: 120.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_secs: Option<u64>,

    /// Endpoint POSTed to extend the session.
    /// Default: `/account/keep-alive/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive_path: Option<String>,

    /// Where the page goes once the session has expired.
    /// Default: `/account/logout/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_path: Option<String>,
}
