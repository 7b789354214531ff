use tracing::warn;

use super::ports::{ConsolePorts, Route};
use super::state::{ScreenLifetime, ScreenState};
use crate::store::DataStoreGateway;
use crate::workflows::error::WorkflowError;
use crate::workflows::moderation::{
    ListingId, ModerationDecision, ModerationWorkflow, PrivateListing,
};

/// Private listings screen: the moderation queue plus approve/reject actions.
///
/// Actions take `&mut self`, so a second decision cannot start while one is in flight.
pub struct ModerationQueueScreen<G> {
    workflow: ModerationWorkflow<G>,
    ports: ConsolePorts,
    lifetime: ScreenLifetime,
    state: ScreenState<Vec<PrivateListing>>,
}

impl<G> ModerationQueueScreen<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(workflow: ModerationWorkflow<G>, ports: ConsolePorts) -> Self {
        Self {
            workflow,
            ports,
            lifetime: ScreenLifetime::default(),
            state: ScreenState::Loading,
        }
    }

    pub fn state(&self) -> &ScreenState<Vec<PrivateListing>> {
        &self.state
    }

    /// Listings currently shown; empty while loading or after a first failed load.
    pub fn listings(&self) -> &[PrivateListing] {
        self.state.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    pub async fn enter(&mut self, session_present: bool) {
        if !session_present {
            self.ports.go(Route::Login);
            return;
        }
        self.reload().await;
    }

    /// Re-fetch the whole queue, replacing what is on screen.
    pub async fn reload(&mut self) {
        let result = self.workflow.list_queue().await;
        if self.lifetime.is_active() {
            self.apply_queue(result);
        }
    }

    /// Approve or reject one listing. Returns `true` when the store accepted the transition.
    pub async fn decide(&mut self, listing_id: &ListingId, decision: ModerationDecision) -> bool {
        let result = self.workflow.transition(listing_id, decision).await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }

        match result {
            Ok(receipt) => {
                self.ports
                    .success(&format!("Listing {} successfully", receipt.decision.label()));
                self.apply_queue(receipt.queue);
                true
            }
            Err(err) => {
                warn!(%listing_id, %decision, error = %err, "moderation decision failed");
                self.ports.failure("Failed to update listing");
                false
            }
        }
    }

    fn apply_queue(&mut self, result: Result<Vec<PrivateListing>, WorkflowError>) {
        match result {
            Ok(listings) => self.state = ScreenState::Ready(listings),
            Err(err) => {
                self.state.fail(&err.to_string());
                self.ports.failure("Failed to load listings");
            }
        }
    }
}
