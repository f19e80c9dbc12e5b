//! Circular progress spinner, drawn as an SVG arc.
//!
//! Each render emits the markup the dataset list would paint: a `<path>`
//! whose `d` attribute sweeps clockwise from twelve o'clock, plus the
//! percentage text. Terminal outcomes emit the replacement badge.

use std::io::Write;

use tracing::warn;

use crate::view::traits::StatusView;
use crate::view::types::{TerminalAction, TerminalOutcome, badge_html};

/// Point on a circle, with 0 degrees at twelve o'clock.
pub fn polar_to_cartesian(cx: f64, cy: f64, radius: f64, angle_degrees: f64) -> (f64, f64) {
    let radians = (angle_degrees - 90.0).to_radians();
    (cx + radius * radians.cos(), cy + radius * radians.sin())
}

/// SVG path data for an arc from `start_angle` to `end_angle` degrees.
pub fn describe_arc(x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) -> String {
    let (start_x, start_y) = polar_to_cartesian(x, y, radius, end_angle);
    let (end_x, end_y) = polar_to_cartesian(x, y, radius, start_angle);
    let large_arc = if end_angle - start_angle <= 180.0 { 0 } else { 1 };

    format!(
        "M {} {} A {} {} 0 {} 0 {} {}",
        start_x, start_y, radius, radius, large_arc, end_x, end_y
    )
}

pub struct ArcView<W: Write> {
    out: W,
    center: f64,
    stroke_width: f64,
}

impl<W: Write> ArcView<W> {
    /// `center` is the circle's `cx`; the arc sits in the middle of the stroke.
    pub fn new(out: W, center: f64, stroke_width: f64) -> Self {
        Self {
            out,
            center,
            stroke_width,
        }
    }

    pub fn radius(&self) -> f64 {
        self.center - self.stroke_width / 2.0
    }

    /// Path data for `progress` percent. The sweep runs one step ahead so
    /// that 0% still shows a sliver.
    pub fn path_for(&self, progress: u8) -> String {
        let sweep = (360.0 / 100.0) * (f64::from(progress) + 1.0);
        describe_arc(self.center, self.center, self.radius(), 0.0, sweep)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, markup: &str) {
        if let Err(e) = writeln!(self.out, "{}", markup) {
            warn!(event = "core.view.write_failed", view = "arc", error = %e);
        }
    }
}

impl<W: Write> StatusView for ArcView<W> {
    fn render_progress(&mut self, progress: u8) {
        let markup = format!(
            r#"<path d="{}" stroke-width="{}"/><span class="progress-percent">{}%</span>"#,
            self.path_for(progress),
            self.stroke_width,
            progress
        );
        self.emit(&markup);
    }

    fn render_terminal(&mut self, outcome: &TerminalOutcome) {
        let markup = match &outcome.action {
            TerminalAction::ReplaceIndicator {
                indicator,
                view_link,
            } => badge_html(*indicator, view_link.as_deref()),
            TerminalAction::Reload => "<!-- reload -->".to_string(),
            TerminalAction::Redirect { url } => {
                format!(r#"<meta http-equiv="refresh" content="0; url={}">"#, url)
            }
        };
        self.emit(&markup);
    }
}
