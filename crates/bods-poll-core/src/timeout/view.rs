use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

/// Presentation of the timeout dialog.
pub trait TimeoutView {
    fn show_warning(&mut self, remaining: Duration);

    fn update_countdown(&mut self, remaining: Duration);

    fn hide_warning(&mut self);

    fn expired(&mut self, logout_url: &str);
}

/// "2 minutes", "1 minute 5 seconds", "45 seconds". Rounds up to whole seconds.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    let (minutes, seconds) = (secs / 60, secs % 60);

    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };

    match (minutes, seconds) {
        (0, s) => plural(s, "second"),
        (m, 0) => plural(m, "minute"),
        (m, s) => format!("{} {}", plural(m, "minute"), plural(s, "second")),
    }
}

pub struct TextTimeoutView<W: Write> {
    out: W,
}

impl<W: Write> TextTimeoutView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            warn!(event = "core.view.write_failed", view = "timeout", error = %e);
        }
    }
}

impl<W: Write> TimeoutView for TextTimeoutView<W> {
    fn show_warning(&mut self, remaining: Duration) {
        let line = format!(
            "You're about to be signed out. You will be signed out in {}.",
            format_remaining(remaining)
        );
        self.emit(&line);
    }

    fn update_countdown(&mut self, remaining: Duration) {
        let line = format!("Signing out in {}", format_remaining(remaining));
        self.emit(&line);
    }

    fn hide_warning(&mut self) {
        self.emit("Session extended.");
    }

    fn expired(&mut self, logout_url: &str) {
        let line = format!("Session expired, redirecting to {}", logout_url);
        self.emit(&line);
    }
}

/// One JSON object per countdown event.
pub struct JsonTimeoutView<W: Write> {
    out: W,
}

impl<W: Write> JsonTimeoutView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, kind: &str, mut body: serde_json::Value) {
        body["type"] = json!(kind);
        body["at"] = json!(Utc::now().to_rfc3339());
        if let Err(e) = writeln!(self.out, "{}", body) {
            warn!(event = "core.view.write_failed", view = "timeout_json", error = %e);
        }
    }
}

impl<W: Write> TimeoutView for JsonTimeoutView<W> {
    fn show_warning(&mut self, remaining: Duration) {
        self.emit("warning", json!({ "remaining_secs": remaining.as_secs() }));
    }

    fn update_countdown(&mut self, remaining: Duration) {
        self.emit("countdown", json!({ "remaining_secs": remaining.as_secs() }));
    }

    fn hide_warning(&mut self) {
        self.emit("extended", json!({}));
    }

    fn expired(&mut self, logout_url: &str) {
        self.emit("expired", json!({ "logout_url": logout_url }));
    }
}
