use std::sync::Arc;

use tracing::warn;

use super::ports::{ConsolePorts, Route, SessionControl};
use super::state::{ScreenLifetime, ScreenState};
use crate::store::DataStoreGateway;
use crate::workflows::catalog::domain::sale_label;
use crate::workflows::catalog::{CatalogRepository, Vehicle, VehicleId};

/// Dashboard: the catalog list with delete, sale status and logout actions.
///
/// Every successful mutation is followed by a full reload of the list.
pub struct DashboardScreen<G> {
    catalog: CatalogRepository<G>,
    ports: ConsolePorts,
    session: Arc<dyn SessionControl>,
    lifetime: ScreenLifetime,
    state: ScreenState<Vec<Vehicle>>,
}

impl<G> DashboardScreen<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(
        catalog: CatalogRepository<G>,
        ports: ConsolePorts,
        session: Arc<dyn SessionControl>,
    ) -> Self {
        Self {
            catalog,
            ports,
            session,
            lifetime: ScreenLifetime::default(),
            state: ScreenState::Loading,
        }
    }

    pub fn state(&self) -> &ScreenState<Vec<Vehicle>> {
        &self.state
    }

    pub fn vehicles(&self) -> &[Vehicle] {
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

    pub async fn reload(&mut self) {
        let result = self.catalog.list_vehicles().await;
        if !self.lifetime.is_active() {
            return;
        }

        match result {
            Ok(vehicles) => self.state = ScreenState::Ready(vehicles),
            Err(err) => {
                warn!(error = %err, "catalog list load failed");
                self.state.fail(&err.to_string());
                self.ports.failure("Failed to load cars");
            }
        }
    }

    pub async fn delete(&mut self, id: &VehicleId) -> bool {
        let result = self.catalog.delete_vehicle(id).await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                self.ports.success("Car deleted successfully");
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(vehicle_id = %id, error = %err, "delete failed");
                self.ports.failure("Failed to delete car");
                false
            }
        }
    }

    /// Mark a vehicle sold or available. `sold` is the target value, not a toggle.
    pub async fn set_sold(&mut self, id: &VehicleId, sold: bool) -> bool {
        let result = self.catalog.set_sold_status(id, sold).await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                self.ports
                    .success(&format!("Car marked as {}", sale_label(sold)));
                self.refresh().await;
                true
            }
            Err(err) => {
                warn!(vehicle_id = %id, sold, error = %err, "sale status change failed");
                self.ports.failure("Failed to update car status");
                false
            }
        }
    }

    pub async fn logout(&mut self) -> bool {
        let result = self.session.sign_out().await;
        if !self.lifetime.is_active() {
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                self.ports.go(Route::Login);
                true
            }
            Err(err) => {
                warn!(error = %err, "sign out failed");
                self.ports.failure("Failed to sign out");
                false
            }
        }
    }

    async fn refresh(&mut self) {
        self.ports.go(Route::Dashboard);
        self.reload().await;
    }
}
