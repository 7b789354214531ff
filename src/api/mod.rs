//! HTTP surface of the back office: admin JSON endpoints plus health, readiness and metrics.

mod admin;
mod routes;

pub use admin::{
    admin_router, AdminServices, DecisionRequest, DecisionResponse, SoldRequest, SESSION_HEADER,
};
pub use routes::{with_admin_routes, AppState};
