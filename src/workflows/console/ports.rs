use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::workflows::catalog::VehicleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Fire-and-forget operator feedback (toasts in the browser console).
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Admin console destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Login,
    PrivateListings,
    EditVehicle(VehicleId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/admin/dashboard".to_string(),
            Route::Login => "/admin/login".to_string(),
            Route::PrivateListings => "/admin/dashboard/private-listings".to_string(),
            Route::EditVehicle(id) => format!("/admin/dashboard/cars/{}", id.0),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate_to(&self, route: Route);
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("sign out failed: {0}")]
    SignOut(String),
}

/// Ends the operator's session. Session presence itself is passed to screens as a flag.
#[async_trait]
pub trait SessionControl: Send + Sync {
    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// Collaborators shared by every screen.
#[derive(Clone)]
pub struct ConsolePorts {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

impl ConsolePorts {
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            notifier,
            navigator,
        }
    }

    pub(crate) fn success(&self, message: &str) {
        self.notifier.notify(NoticeKind::Success, message);
    }

    pub(crate) fn failure(&self, message: &str) {
        self.notifier.notify(NoticeKind::Error, message);
    }

    pub(crate) fn go(&self, route: Route) {
        self.navigator.navigate_to(route);
    }
}
