//! The poll state machine as a pure function.

use crate::status::types::{Classification, SessionStatus, UnknownCause};

/// Result of applying one reading to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Session was already terminal; the reading is discarded.
    Ignored,
    /// Still waiting; nothing to render.
    Waiting { status: SessionStatus },
    /// Job is running. `changed` is false when `progress` equals the last
    /// rendered value, in which case the view must not be repainted.
    Progressed { progress: u8, changed: bool },
    /// Session reached a terminal status.
    Finished {
        status: SessionStatus,
        cause: Option<UnknownCause>,
    },
}

/// Apply one reading to a session in `current` state.
///
/// A failed read (`Err`) is terminal. A `pending` reading never moves an
/// `InProgress` session backwards. Progress of 100 is not terminal on its own;
/// only an explicit success or error status ends the session.
pub fn apply(
    current: SessionStatus,
    last_progress: Option<u8>,
    reading: Result<Classification, UnknownCause>,
) -> Transition {
    if current.is_terminal() {
        return Transition::Ignored;
    }

    let classification = match reading {
        Ok(classification) => classification,
        Err(cause) => {
            return Transition::Finished {
                status: SessionStatus::Unknown,
                cause: Some(cause),
            };
        }
    };

    match classification {
        Classification::Pending => Transition::Waiting { status: current },
        Classification::Progress(progress) => {
            let progress = progress.min(100);
            Transition::Progressed {
                progress,
                changed: last_progress != Some(progress),
            }
        }
        Classification::Succeeded => Transition::Finished {
            status: SessionStatus::Succeeded,
            cause: None,
        },
        Classification::Failed => Transition::Finished {
            status: SessionStatus::Failed,
            cause: None,
        },
        Classification::Unrecognized(status) => Transition::Finished {
            status: SessionStatus::Unknown,
            cause: Some(UnknownCause::Unrecognized { status }),
        },
    }
}
