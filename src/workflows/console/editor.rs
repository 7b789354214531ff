use tracing::warn;

use super::ports::{ConsolePorts, Route};
use super::state::{ScreenLifetime, ScreenState};
use crate::store::DataStoreGateway;
use crate::workflows::catalog::{CatalogRepository, EditContext, VehicleChanges, VehicleId};

/// Edit screen for one catalog vehicle.
pub struct VehicleEditorScreen<G> {
    catalog: CatalogRepository<G>,
    ports: ConsolePorts,
    lifetime: ScreenLifetime,
    vehicle_id: VehicleId,
    state: ScreenState<EditContext>,
}

impl<G> VehicleEditorScreen<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(catalog: CatalogRepository<G>, ports: ConsolePorts, vehicle_id: VehicleId) -> Self {
        Self {
            catalog,
            ports,
            lifetime: ScreenLifetime::default(),
            vehicle_id,
            state: ScreenState::Loading,
        }
    }

    pub fn state(&self) -> &ScreenState<EditContext> {
        &self.state
    }

    pub fn lifetime(&self) -> ScreenLifetime {
        self.lifetime.clone()
    }

    /// Load the vehicle and brand list. A failed load leaves the screen for the dashboard.
    pub async fn enter(&mut self, session_present: bool) {
        if !session_present {
            self.ports.go(Route::Login);
            return;
        }

        let result = self.catalog.load_edit_context(&self.vehicle_id).await;
        if !self.lifetime.is_active() {
            return;
        }

        match result {
            Ok(context) => self.state = ScreenState::Ready(context),
            Err(err) => {
                warn!(vehicle_id = %self.vehicle_id, error = %err, "edit screen load failed");
                self.state.fail(&err.to_string());
                self.ports.failure("Failed to load car details");
                self.ports.go(Route::Dashboard);
            }
        }
    }

    /// Save the edit form. Returns `true` when the change was stored.
    pub async fn save(&mut self, changes: VehicleChanges) -> bool {
        let result = self.catalog.update_vehicle(&self.vehicle_id, changes).await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                self.ports.success("Car updated successfully");
                self.ports.go(Route::Dashboard);
                true
            }
            Err(err) => {
                warn!(vehicle_id = %self.vehicle_id, error = %err, "vehicle save failed");
                self.ports.failure(&format!("Failed to update car: {err}"));
                false
            }
        }
    }
}
