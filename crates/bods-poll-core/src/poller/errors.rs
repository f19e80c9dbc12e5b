use crate::errors::BodsError;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Poll interval must be greater than zero")]
    ZeroInterval,

    #[error("Invalid poll endpoint '{endpoint}': cannot be empty")]
    EmptyEndpoint { endpoint: String },

    #[error("Invalid dataset id '{id}': expected a positive integer")]
    InvalidDatasetId { id: String },
}

impl BodsError for PollError {
    fn error_code(&self) -> &'static str {
        match self {
            PollError::ZeroInterval => "POLL_ZERO_INTERVAL",
            PollError::EmptyEndpoint { .. } => "POLL_EMPTY_ENDPOINT",
            PollError::InvalidDatasetId { .. } => "POLL_INVALID_DATASET_ID",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}
