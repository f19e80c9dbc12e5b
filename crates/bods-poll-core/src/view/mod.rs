//! Rendering of poll sessions.
//!
//! Views are pure presentation. They map progress and terminal outcomes to
//! output and hold no business logic, so a session can drive any of them.

pub mod arc;
pub mod bar;
pub mod json;
pub mod traits;
pub mod types;

pub use arc::{ArcView, describe_arc, polar_to_cartesian};
pub use bar::BarView;
pub use json::JsonView;
pub use traits::StatusView;
pub use types::{Indicator, TerminalAction, TerminalOutcome, badge_html};
