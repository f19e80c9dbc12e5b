//! Status vocabulary and the pure transition function shared by all pollers.

pub mod transition;
pub mod types;

pub use transition::{Transition, apply};
pub use types::{Classification, SessionStatus, StatusResponse, UnknownCause};
