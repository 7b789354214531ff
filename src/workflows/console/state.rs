use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Observable state of one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState<T> {
    Loading,
    Ready(T),
    /// A load failed. `retained` holds whatever the screen showed before the attempt.
    Failed { message: String, retained: Option<T> },
}

impl<T> ScreenState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScreenState::Loading)
    }

    /// Data currently on screen, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            ScreenState::Loading => None,
            ScreenState::Ready(data) => Some(data),
            ScreenState::Failed { retained, .. } => retained.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScreenState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Replace with a failure, keeping the data that was on screen.
    pub(crate) fn fail(&mut self, message: &str) {
        let previous = std::mem::replace(self, ScreenState::Loading);
        let retained = match previous {
            ScreenState::Loading => None,
            ScreenState::Ready(data) => Some(data),
            ScreenState::Failed { retained, .. } => retained,
        };
        *self = ScreenState::Failed {
            message: message.to_string(),
            retained,
        };
    }
}

/// Shared flag marking a screen as abandoned. Clones observe the same flag, so the handle
/// given to the navigation layer can retire a screen while one of its calls is in flight.
#[derive(Debug, Clone, Default)]
pub struct ScreenLifetime {
    abandoned: Arc<AtomicBool>,
}

impl ScreenLifetime {
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        !self.abandoned.load(Ordering::Acquire)
    }
}
