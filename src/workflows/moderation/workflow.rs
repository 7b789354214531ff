use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::domain::{ListingId, ModerationDecision, PrivateListing};
use crate::store::tables::{BRANDS, PRIVATE_LISTINGS, PROCESS_PRIVATE_LISTING};
use crate::store::{decode_rows, DataStoreGateway, JoinSpec, QuerySpec, Row};
use crate::workflows::error::WorkflowError;

/// Result of a successful transition. The procedure has been applied; `queue` is the reload
/// issued afterwards and may fail independently.
#[derive(Debug)]
pub struct TransitionReceipt {
    pub listing_id: ListingId,
    pub decision: ModerationDecision,
    pub queue: Result<Vec<PrivateListing>, WorkflowError>,
}

/// Drives listing status transitions and keeps the moderation view in step with the store.
pub struct ModerationWorkflow<G> {
    gateway: Arc<G>,
}

impl<G> Clone for ModerationWorkflow<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> ModerationWorkflow<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Every listing with its brand, newest first. All or nothing.
    pub async fn list_queue(&self) -> Result<Vec<PrivateListing>, WorkflowError> {
        let spec = QuerySpec::from(PRIVATE_LISTINGS)
            .join(JoinSpec::to_one(
                "brand",
                BRANDS,
                "brand_id",
                &["id", "name", "logo_url"],
            ))
            .order_by("created_at", false);

        let rows = self.gateway.query(&spec).await.map_err(|err| {
            warn!(error = %err, "moderation queue load failed");
            WorkflowError::from(err)
        })?;
        let mut listings: Vec<PrivateListing> =
            decode_rows(PRIVATE_LISTINGS, rows).map_err(|err| {
                warn!(error = %err, "moderation queue rows could not be decoded");
                WorkflowError::from(err)
            })?;
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    /// Apply `decision` through the store's atomic listing procedure, then reload the queue.
    ///
    /// The current status is not checked here; the procedure decides whether the transition is
    /// legal. The reload starts only after the procedure reported success.
    pub async fn transition(
        &self,
        listing_id: &ListingId,
        decision: ModerationDecision,
    ) -> Result<TransitionReceipt, WorkflowError> {
        let mut args = Row::new();
        args.insert(
            "p_listing_id".to_string(),
            Value::String(listing_id.0.clone()),
        );
        args.insert(
            "p_status".to_string(),
            Value::String(decision.label().to_string()),
        );

        self.gateway
            .call_procedure(PROCESS_PRIVATE_LISTING, args)
            .await
            .map_err(|err| {
                warn!(%listing_id, %decision, error = %err, "listing transition rejected");
                WorkflowError::from(err)
            })?;
        info!(%listing_id, %decision, "listing transition applied");

        let queue = self.list_queue().await;
        Ok(TransitionReceipt {
            listing_id: listing_id.clone(),
            decision,
            queue,
        })
    }
}
