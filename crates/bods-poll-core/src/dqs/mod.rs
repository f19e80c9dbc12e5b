//! Data quality score (DQS) report status.
//!
//! The review page polls the revision's DQS status and reloads once the
//! report is no longer pending. The endpoint returns a bare JSON value that
//! is compared directly against `"PENDING"`; anything else, including
//! `null` or an object, counts as ready.

use crate::config::{BodsConfig, PollConfig};
use crate::page::PageContext;
use crate::poller::{PollError, PollPolicy, PollSession};
use crate::status::{Classification, SessionStatus};
use crate::view::{Indicator, TerminalAction};

pub const DQS_PENDING: &str = "PENDING";
pub const DEFAULT_RESOURCE_CLASS: &str = "dataset_revision";

#[derive(Debug, Clone, Default)]
pub struct DqsStatusPolicy;

impl PollPolicy for DqsStatusPolicy {
    type Response = serde_json::Value;

    fn name(&self) -> &'static str {
        "dqs_status"
    }

    fn classify(&self, response: &serde_json::Value) -> Classification {
        if response.as_str() == Some(DQS_PENDING) {
            Classification::Pending
        } else {
            Classification::Succeeded
        }
    }

    fn terminal_action(&self, status: SessionStatus, _page: &PageContext) -> TerminalAction {
        match status {
            SessionStatus::Succeeded => TerminalAction::Reload,
            other => TerminalAction::ReplaceIndicator {
                indicator: Indicator::for_status(other),
                view_link: None,
            },
        }
    }
}

/// `<api_root>/<resource_class>/<revision_id>/dqs-status/`
pub fn dqs_status_path(api_root: &str, resource_class: &str, revision_id: u64) -> String {
    format!(
        "{}/{}/{}/dqs-status/",
        api_root.trim_end_matches('/'),
        resource_class.trim_matches('/'),
        revision_id
    )
}

/// Build the DQS status session for one revision.
pub fn dqs_session(
    config: &BodsConfig,
    resource_class: &str,
    revision_id: u64,
    page: PageContext,
) -> Result<PollSession<DqsStatusPolicy>, PollError> {
    let poll: &PollConfig = &config.poll;
    Ok(PollSession::new(
        format!("dqs-{}", revision_id),
        dqs_status_path(config.portal.api_root(), resource_class, revision_id),
        poll.dqs_interval(),
        DqsStatusPolicy,
        page,
    )?
    .with_sequencing(poll.sequencing()))
}
