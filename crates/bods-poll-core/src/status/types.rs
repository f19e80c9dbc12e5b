use serde::{Deserialize, Serialize};

/// Lifecycle of a single poll session.
///
/// Moves monotonically toward one of the terminal states; `InProgress` may
/// repeat but never returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Unknown,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Succeeded | SessionStatus::Failed | SessionStatus::Unknown
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Succeeded => "succeeded",
            SessionStatus::Failed => "failed",
            SessionStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Body of `GET /dataset/<id>/progress/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub progress: u8,
    pub status: String,
}

/// What a policy made of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Job accepted but not started.
    Pending,
    /// Job running, with its percentage.
    Progress(u8),
    Succeeded,
    Failed,
    /// A status string outside the policy's vocabulary.
    Unrecognized(String),
}

/// Why a session ended in [`SessionStatus::Unknown`].
///
/// Every cause renders the same generic badge; the cause is kept so callers
/// can tell "server said something odd" apart from "server unreachable".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnknownCause {
    /// Non-2xx response or network failure.
    Transport { message: String },
    /// Body was not the expected JSON shape.
    Malformed { message: String },
    /// Status string outside the known vocabulary.
    Unrecognized { status: String },
}

impl std::fmt::Display for UnknownCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownCause::Transport { message } => write!(f, "transport error: {}", message),
            UnknownCause::Malformed { message } => write!(f, "malformed response: {}", message),
            UnknownCause::Unrecognized { status } => write!(f, "unrecognized status '{}'", status),
        }
    }
}
