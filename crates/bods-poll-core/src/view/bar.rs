use std::io::Write;

use tracing::warn;

use crate::view::traits::StatusView;
use crate::view::types::{TerminalAction, TerminalOutcome};

const BAR_WIDTH: usize = 20;

/// Line-per-update text progress bar, one line per render.
pub struct BarView<W: Write> {
    out: W,
    label: String,
}

impl<W: Write> BarView<W> {
    pub fn new(out: W, label: impl Into<String>) -> Self {
        Self {
            out,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}: {}", self.label, line) {
            warn!(event = "core.view.write_failed", view = "bar", error = %e);
        }
    }
}

pub fn bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

impl<W: Write> StatusView for BarView<W> {
    fn render_progress(&mut self, progress: u8) {
        let line = format!("{} {:>3}%", bar(progress), progress);
        self.emit(&line);
    }

    fn render_terminal(&mut self, outcome: &TerminalOutcome) {
        let line = match &outcome.action {
            TerminalAction::ReplaceIndicator {
                indicator,
                view_link: Some(link),
            } => format!("{} (view: {})", indicator.title(), link),
            TerminalAction::ReplaceIndicator {
                indicator,
                view_link: None,
            } => indicator.title().to_string(),
            TerminalAction::Reload => "ready, reload the page".to_string(),
            TerminalAction::Redirect { url } => format!("redirecting to {}", url),
        };
        self.emit(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SessionStatus;
    use crate::view::types::Indicator;

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar(0), format!("[{}]", " ".repeat(20)));
        assert_eq!(bar(50), format!("[{}{}]", "#".repeat(10), " ".repeat(10)));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn test_render_progress_line() {
        let mut view = BarView::new(Vec::new(), "dataset 7");
        view.render_progress(40);
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, format!("dataset 7: {}  40%\n", bar(40)));
    }

    #[test]
    fn test_render_terminal_with_link() {
        let mut view = BarView::new(Vec::new(), "dataset 7");
        view.render_terminal(&TerminalOutcome {
            session: "dataset-7".to_string(),
            status: SessionStatus::Succeeded,
            cause: None,
            action: TerminalAction::ReplaceIndicator {
                indicator: Indicator::Draft,
                view_link: Some("/datasets/7/update/review".to_string()),
            },
        });
        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, "dataset 7: Draft (view: /datasets/7/update/review)\n");
    }
}
