//! Application-level structured events shared by the CLI commands.

use tracing::{error, info, warn};

use crate::errors::BodsError;
use crate::status::SessionStatus;
use crate::view::TerminalOutcome;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}

/// Log a typed error with its code. User errors are warnings.
pub fn log_bods_error(error: &dyn BodsError) {
    if error.is_user_error() {
        warn!(
            event = "core.app.user_error",
            code = error.error_code(),
            error = %error
        );
    } else {
        error!(
            event = "core.app.error_occurred",
            code = error.error_code(),
            error = %error
        );
    }
}

/// Log how a poll session ended, keeping any unknown cause visible.
pub fn log_session_outcome(outcome: &TerminalOutcome) {
    match (outcome.status, &outcome.cause) {
        (SessionStatus::Succeeded, _) => info!(
            event = "core.app.session_succeeded",
            session = %outcome.session
        ),
        (status, Some(cause)) => warn!(
            event = "core.app.session_unresolved",
            session = %outcome.session,
            status = %status,
            cause = %cause
        ),
        (status, None) => warn!(
            event = "core.app.session_failed",
            session = %outcome.session,
            status = %status
        ),
    }
}
