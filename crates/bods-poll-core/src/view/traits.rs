//! View trait definition.

use crate::view::types::TerminalOutcome;

/// Something that can display a poll session.
///
/// A session calls `render_progress` only when the percentage changes, and
/// calls `render_terminal` exactly once, when it finishes.
pub trait StatusView {
    fn render_progress(&mut self, progress: u8);

    fn render_terminal(&mut self, outcome: &TerminalOutcome);
}

impl<V: StatusView + ?Sized> StatusView for Box<V> {
    fn render_progress(&mut self, progress: u8) {
        (**self).render_progress(progress);
    }

    fn render_terminal(&mut self, outcome: &TerminalOutcome) {
        (**self).render_terminal(outcome);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Everything a view was asked to render.
    #[derive(Debug, Default)]
    pub struct Recorded {
        pub progress: Vec<u8>,
        pub terminal: Vec<TerminalOutcome>,
    }

    /// View that records calls, shareable with the test body.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingView(pub Arc<Mutex<Recorded>>);

    impl RecordingView {
        pub fn progress(&self) -> Vec<u8> {
            self.0.lock().unwrap().progress.clone()
        }

        pub fn terminal(&self) -> Vec<TerminalOutcome> {
            self.0.lock().unwrap().terminal.clone()
        }
    }

    impl StatusView for RecordingView {
        fn render_progress(&mut self, progress: u8) {
            self.0.lock().unwrap().progress.push(progress);
        }

        fn render_terminal(&mut self, outcome: &TerminalOutcome) {
            self.0.lock().unwrap().terminal.push(outcome.clone());
        }
    }
}
