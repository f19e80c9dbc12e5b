use std::io::Write;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::view::traits::StatusView;
use crate::view::types::TerminalOutcome;

/// One JSON object per line, for piping into other tools.
pub struct JsonView<W: Write> {
    out: W,
    session: String,
}

impl<W: Write> JsonView<W> {
    pub fn new(out: W, session: impl Into<String>) -> Self {
        Self {
            out,
            session: session.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, kind: &str, body: serde_json::Result<serde_json::Value>) {
        let result = body
            .map(|mut value| {
                value["type"] = json!(kind);
                value["at"] = json!(Utc::now().to_rfc3339());
                value
            })
            .map_err(std::io::Error::other)
            .and_then(|value| writeln!(self.out, "{}", value));
        if let Err(e) = result {
            warn!(event = "core.view.write_failed", view = "json", error = %e);
        }
    }
}

impl<W: Write> StatusView for JsonView<W> {
    fn render_progress(&mut self, progress: u8) {
        let body = json!({ "session": self.session, "progress": progress });
        self.emit("progress", Ok(body));
    }

    fn render_terminal(&mut self, outcome: &TerminalOutcome) {
        self.emit("terminal", serde_json::to_value(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{SessionStatus, UnknownCause};
    use crate::view::types::{Indicator, TerminalAction};

    #[test]
    fn test_progress_line() {
        let mut view = JsonView::new(Vec::new(), "dataset-7");
        view.render_progress(40);
        let out = String::from_utf8(view.into_inner()).unwrap();
        let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["session"], "dataset-7");
        assert_eq!(json["progress"], 40);
        assert!(json["at"].is_string());
    }

    #[test]
    fn test_terminal_line_keeps_unknown_cause() {
        let mut view = JsonView::new(Vec::new(), "dataset-7");
        view.render_terminal(&TerminalOutcome {
            session: "dataset-7".to_string(),
            status: SessionStatus::Unknown,
            cause: Some(UnknownCause::Transport {
                message: "HTTP 502 Bad Gateway".to_string(),
            }),
            action: TerminalAction::ReplaceIndicator {
                indicator: Indicator::Processing,
                view_link: None,
            },
        });
        let out = String::from_utf8(view.into_inner()).unwrap();
        let json: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(json["type"], "terminal");
        assert_eq!(json["status"], "unknown");
        assert_eq!(json["cause"]["kind"], "transport");
        assert_eq!(json["indicator"], "processing");
    }
}
