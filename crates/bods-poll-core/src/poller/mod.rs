//! Timer-driven status pollers.
//!
//! A [`PollSession`] pairs an endpoint with a [`PollPolicy`] (what the
//! responses mean) and drives a [`StatusView`](crate::view::StatusView) until
//! the job it watches reaches a terminal status.

pub mod dataset;
pub mod errors;
pub mod policy;
pub mod session;
pub mod source;

pub use dataset::{DatasetProgressPolicy, dataset_progress_path, dataset_session};
pub use errors::PollError;
pub use policy::PollPolicy;
pub use session::{PollReport, PollSession, run_all};
pub use source::StatusSource;
