//! Poll policy trait definition.

use serde::de::DeserializeOwned;

use crate::page::PageContext;
use crate::status::{Classification, SessionStatus};
use crate::view::TerminalAction;

/// Decides what a status endpoint's responses mean.
///
/// Each widget on the portal polls a different endpoint with a different
/// vocabulary. The session loop is shared; only the policy differs.
pub trait PollPolicy: Send + Sync {
    /// Shape of the endpoint's JSON body.
    type Response: DeserializeOwned;

    /// Short name used in logs (e.g. "dataset_progress").
    fn name(&self) -> &'static str;

    /// Classify one response.
    fn classify(&self, response: &Self::Response) -> Classification;

    /// What the page does once the session reaches terminal `status`.
    fn terminal_action(&self, status: SessionStatus, page: &PageContext) -> TerminalAction;
}
