use serde::Serialize;

use crate::status::{SessionStatus, UnknownCause};

pub const STATUS_CSS: &str = "status-indicator";
pub const LINK_CSS: &str = "govuk-link";

/// Badge that replaces a progress indicator once a session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Error,
    Draft,
    /// Shown for sessions that ended in `Unknown`.
    Processing,
}

impl Indicator {
    pub fn for_status(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Succeeded => Indicator::Draft,
            SessionStatus::Failed => Indicator::Error,
            _ => Indicator::Processing,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Indicator::Error => "Error",
            Indicator::Draft => "Draft",
            Indicator::Processing => "Processing",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Indicator::Error => "status-indicator--error",
            Indicator::Draft => "status-indicator--draft",
            Indicator::Processing => "status-indicator--success",
        }
    }
}

/// What the page does once a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TerminalAction {
    /// Swap the progress indicator for a badge, optionally followed by a link.
    ReplaceIndicator {
        indicator: Indicator,
        view_link: Option<String>,
    },
    /// Reload the whole page.
    Reload,
    /// Navigate elsewhere.
    Redirect { url: String },
}

/// Final state of a session as handed to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalOutcome {
    pub session: String,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<UnknownCause>,
    #[serde(flatten)]
    pub action: TerminalAction,
}

/// HTML the portal paints in place of a progress indicator.
pub fn badge_html(indicator: Indicator, view_link: Option<&str>) -> String {
    let badge = format!(
        r#"<span class="{} {}">{}</span>"#,
        STATUS_CSS,
        indicator.css_class(),
        indicator.title()
    );
    match view_link {
        Some(href) => format!(
            r#"{}<a class="{} govuk-!-padding-left-1" href="{}">View</a>"#,
            badge, LINK_CSS, href
        ),
        None => badge,
    }
}
