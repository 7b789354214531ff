//! Screen coordinators for the admin console.
//!
//! Each screen sequences catalog or moderation calls, owns a `loading | ready | failed`
//! state, and reports outcomes through the notifier and navigator ports. Errors stop here:
//! every failure produces one error notice plus the screen's fallback.

mod dashboard;
mod editor;
pub mod ports;
mod queue;
pub mod state;

#[cfg(test)]
mod tests;

pub use dashboard::DashboardScreen;
pub use editor::VehicleEditorScreen;
pub use ports::{
    ConsolePorts, Navigator, NoticeKind, Notifier, Route, SessionControl, SessionError,
};
pub use queue::ModerationQueueScreen;
pub use state::{ScreenLifetime, ScreenState};
