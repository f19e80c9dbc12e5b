//! Session timeout countdown.
//!
//! Counts down to the server-side session expiry. Inside the warning window
//! the view shows a dialog with a live countdown; the user may extend the
//! session, which POSTs to the keep-alive endpoint and restarts the clock.
//! At zero the page is sent to the logout URL and the countdown stops.

pub mod session;
pub mod view;

pub use session::{
    CsrfKeepAlive, KeepAlive, SessionTimeout, TimeoutHandle, TimeoutReport, TimeoutState,
};
pub use view::{JsonTimeoutView, TextTimeoutView, TimeoutView, format_remaining};
