//! Dataset upload progress.
//!
//! Used by both the single-dataset progress page and the dataset list, where
//! each row's spinner is its own session.

use crate::config::PollConfig;
use crate::page::PageContext;
use crate::poller::errors::PollError;
use crate::poller::policy::PollPolicy;
use crate::poller::session::PollSession;
use crate::status::{Classification, SessionStatus, StatusResponse};
use crate::view::{Indicator, TerminalAction};

pub const INDEXING: &str = "indexing";
pub const PENDING: &str = "pending";
pub const ERROR: &str = "error";

#[derive(Debug, Clone)]
pub struct DatasetProgressPolicy {
    dataset_id: String,
    success_statuses: Vec<String>,
}

impl DatasetProgressPolicy {
    pub fn new(dataset_id: impl Into<String>, success_statuses: Vec<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            success_statuses,
        }
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }
}

impl PollPolicy for DatasetProgressPolicy {
    type Response = StatusResponse;

    fn name(&self) -> &'static str {
        "dataset_progress"
    }

    fn classify(&self, response: &StatusResponse) -> Classification {
        match response.status.as_str() {
            INDEXING => Classification::Progress(response.progress),
            PENDING => Classification::Pending,
            ERROR => Classification::Failed,
            status if self.success_statuses.iter().any(|s| s == status) => {
                Classification::Succeeded
            }
            other => Classification::Unrecognized(other.to_string()),
        }
    }

    fn terminal_action(&self, status: SessionStatus, page: &PageContext) -> TerminalAction {
        TerminalAction::ReplaceIndicator {
            indicator: Indicator::for_status(status),
            view_link: page.view_link(&self.dataset_id),
        }
    }
}

pub fn dataset_progress_path(dataset_id: &str) -> String {
    format!("/dataset/{}/progress/", dataset_id)
}

/// Build the progress session for one dataset.
pub fn dataset_session(
    dataset_id: &str,
    config: &PollConfig,
    page: PageContext,
) -> Result<PollSession<DatasetProgressPolicy>, PollError> {
    if dataset_id.is_empty() || !dataset_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PollError::InvalidDatasetId {
            id: dataset_id.to_string(),
        });
    }

    let policy = DatasetProgressPolicy::new(dataset_id, config.success_statuses());
    Ok(PollSession::new(
        format!("dataset-{}", dataset_id),
        dataset_progress_path(dataset_id),
        config.interval(),
        policy,
        page,
    )?
    .with_sequencing(config.sequencing()))
}
