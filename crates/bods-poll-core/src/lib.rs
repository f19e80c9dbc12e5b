//! bods-poll-core: Status polling widgets for the Bus Open Data Service portal
//!
//! This library drives the portal's long-running server jobs from the
//! client side. A poll session reads a job status on a fixed interval and
//! renders it through a view until the job reaches a terminal state. It is
//! used by the `bods-poll` CLI.
//!
//! # Main Entry Points
//!
//! - [`poller`] - Poll sessions, policies and the dataset progress widget
//! - [`dqs`] - Data quality score review status
//! - [`observations`] - Observation suppression requests
//! - [`timeout`] - Session timeout countdown
//! - [`view`] - Progress bar, SVG arc and JSON renderers
//! - [`config`] - Configuration management

pub mod config;
pub mod dqs;
pub mod errors;
pub mod events;
pub mod http;
pub mod logging;
pub mod observations;
pub mod page;
pub mod poller;
pub mod status;
pub mod timeout;
pub mod view;

// Re-export commonly used types at crate root for convenience
pub use config::BodsConfig;
pub use dqs::{DqsStatusPolicy, dqs_session};
pub use errors::{BodsError, ConfigError};
pub use http::{CsrfStrategy, CsrfToken, HttpClient, HttpError};
pub use page::PageContext;
pub use poller::{
    DatasetProgressPolicy, PollError, PollPolicy, PollReport, PollSession, StatusSource,
    dataset_session, run_all,
};
pub use status::{Classification, SessionStatus, StatusResponse, UnknownCause};
pub use timeout::{CsrfKeepAlive, SessionTimeout, TimeoutHandle, TimeoutReport};
pub use view::{ArcView, BarView, JsonView, StatusView, TerminalAction, TerminalOutcome};

// Re-export logging initialization
pub use logging::init_logging;
