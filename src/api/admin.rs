use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::store::DataStoreGateway;
use crate::workflows::catalog::{
    Brand, CatalogRepository, EditContext, Vehicle, VehicleChanges, VehicleId,
};
use crate::workflows::console::Route;
use crate::workflows::moderation::{
    ListingId, ListingStatus, ModerationDecision, ModerationWorkflow, PrivateListing,
};

/// Header carrying the operator session. Only its presence is checked here.
pub const SESSION_HEADER: &str = "x-admin-session";

/// Catalog and moderation components sharing one gateway.
pub struct AdminServices<G> {
    pub catalog: CatalogRepository<G>,
    pub moderation: ModerationWorkflow<G>,
}

impl<G> Clone for AdminServices<G> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            moderation: self.moderation.clone(),
        }
    }
}

impl<G> AdminServices<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            catalog: CatalogRepository::new(Arc::clone(&gateway)),
            moderation: ModerationWorkflow::new(gateway),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SoldRequest {
    pub sold: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub status: ModerationDecision,
}

/// Outcome of a moderation decision. The transition is applied even when the queue reload
/// afterwards failed; `refresh_error` then carries that failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub listing_id: ListingId,
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings: Option<Vec<PrivateListing>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

/// Router builder for the `/api/v1/admin` endpoints, all behind the session check.
pub fn admin_router<G>(services: AdminServices<G>) -> Router
where
    G: DataStoreGateway + 'static,
{
    Router::new()
        .route("/api/v1/admin/brands", get(brands_handler::<G>))
        .route("/api/v1/admin/vehicles", get(vehicles_handler::<G>))
        .route(
            "/api/v1/admin/vehicles/:vehicle_id",
            get(edit_context_handler::<G>)
                .put(update_handler::<G>)
                .delete(delete_handler::<G>),
        )
        .route("/api/v1/admin/vehicles/:vehicle_id/sold", put(sold_handler::<G>))
        .route("/api/v1/admin/listings", get(listings_handler::<G>))
        .route(
            "/api/v1/admin/listings/:listing_id/decision",
            post(decision_handler::<G>),
        )
        .route_layer(middleware::from_fn(require_session))
        .with_state(services)
}

async fn require_session(request: Request, next: Next) -> Response {
    let present = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());

    if !present {
        warn!(path = %request.uri().path(), "admin request without session");
        let payload = json!({
            "error": "admin session required",
            "redirect": Route::Login.path(),
        });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    }

    next.run(request).await
}

pub(crate) async fn brands_handler<G>(
    State(services): State<AdminServices<G>>,
) -> Result<Json<Vec<Brand>>, AppError>
where
    G: DataStoreGateway + 'static,
{
    Ok(Json(services.catalog.list_brands().await?))
}

pub(crate) async fn vehicles_handler<G>(
    State(services): State<AdminServices<G>>,
) -> Result<Json<Vec<Vehicle>>, AppError>
where
    G: DataStoreGateway + 'static,
{
    Ok(Json(services.catalog.list_vehicles().await?))
}

pub(crate) async fn edit_context_handler<G>(
    State(services): State<AdminServices<G>>,
    Path(vehicle_id): Path<String>,
) -> Result<Json<EditContext>, AppError>
where
    G: DataStoreGateway + 'static,
{
    let id = VehicleId(vehicle_id);
    Ok(Json(services.catalog.load_edit_context(&id).await?))
}

pub(crate) async fn update_handler<G>(
    State(services): State<AdminServices<G>>,
    Path(vehicle_id): Path<String>,
    payload: Result<Json<VehicleChanges>, JsonRejection>,
) -> Result<Json<Vehicle>, AppError>
where
    G: DataStoreGateway + 'static,
{
    let Json(changes) = payload?;
    let id = VehicleId(vehicle_id);
    services.catalog.update_vehicle(&id, changes).await?;
    Ok(Json(services.catalog.load_vehicle_for_edit(&id).await?))
}

pub(crate) async fn delete_handler<G>(
    State(services): State<AdminServices<G>>,
    Path(vehicle_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    G: DataStoreGateway + 'static,
{
    let id = VehicleId(vehicle_id);
    services.catalog.delete_vehicle(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn sold_handler<G>(
    State(services): State<AdminServices<G>>,
    Path(vehicle_id): Path<String>,
    payload: Result<Json<SoldRequest>, JsonRejection>,
) -> Result<Json<Vehicle>, AppError>
where
    G: DataStoreGateway + 'static,
{
    let Json(request) = payload?;
    let id = VehicleId(vehicle_id);
    services.catalog.set_sold_status(&id, request.sold).await?;
    Ok(Json(services.catalog.load_vehicle_for_edit(&id).await?))
}

pub(crate) async fn listings_handler<G>(
    State(services): State<AdminServices<G>>,
) -> Result<Json<Vec<PrivateListing>>, AppError>
where
    G: DataStoreGateway + 'static,
{
    Ok(Json(services.moderation.list_queue().await?))
}

pub(crate) async fn decision_handler<G>(
    State(services): State<AdminServices<G>>,
    Path(listing_id): Path<String>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, AppError>
where
    G: DataStoreGateway + 'static,
{
    let Json(request) = payload?;
    let id = ListingId(listing_id);
    let receipt = services.moderation.transition(&id, request.status).await?;
    info!(
        listing_id = %receipt.listing_id,
        decision = %receipt.decision,
        "decision applied over http"
    );

    let (listings, refresh_error) = match receipt.queue {
        Ok(listings) => (Some(listings), None),
        Err(err) => (None, Some(err.to_string())),
    };

    Ok(Json(DecisionResponse {
        listing_id: receipt.listing_id,
        status: receipt.decision.target_status(),
        listings,
        refresh_error,
    }))
}
