//! Same-origin HTTP client for the portal's JSON endpoints.
//!
//! Every request carries the configured session cookie. POSTs additionally
//! carry a CSRF token that is resolved once per client (see [`csrf`]).

pub mod client;
pub mod csrf;
pub mod errors;

pub use client::{HttpClient, HttpClientSettings};
pub use csrf::{CsrfStrategy, CsrfToken};
pub use errors::{CsrfError, HttpError};
