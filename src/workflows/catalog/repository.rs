use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::domain::{
    sale_label, Brand, EditContext, Vehicle, VehicleChanges, VehicleId, VehicleRow,
};
use crate::store::tables::{BRANDS, CARS, CAR_FEATURES};
use crate::store::{decode_rows, DataStoreGateway, JoinSpec, QuerySpec, Row, StoreError};
use crate::workflows::error::WorkflowError;

const BRAND_COLUMNS: &[&str] = &["id", "name", "logo_url"];
const FEATURE_COLUMNS: &[&str] = &["id", "name", "available"];

/// Read/write access to catalog vehicles and the brand lookup list.
pub struct CatalogRepository<G> {
    gateway: Arc<G>,
}

impl<G> Clone for CatalogRepository<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> CatalogRepository<G>
where
    G: DataStoreGateway + 'static,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Load one vehicle with its brand and features. Absent ids fail with `NotFound`.
    pub async fn load_vehicle_for_edit(&self, id: &VehicleId) -> Result<Vehicle, WorkflowError> {
        fetch_vehicle(self.gateway.as_ref(), id).await
    }

    /// All brands, name ascending.
    pub async fn list_brands(&self) -> Result<Vec<Brand>, WorkflowError> {
        fetch_brands(self.gateway.as_ref()).await
    }

    /// Load the vehicle and the brand list concurrently.
    ///
    /// Both reads run as their own tasks. The first failure is returned immediately; the other
    /// task is left to finish and its result is dropped.
    pub async fn load_edit_context(&self, id: &VehicleId) -> Result<EditContext, WorkflowError> {
        let vehicle_task = {
            let gateway = Arc::clone(&self.gateway);
            let id = id.clone();
            tokio::spawn(async move { fetch_vehicle(gateway.as_ref(), &id).await })
        };
        let brands_task = {
            let gateway = Arc::clone(&self.gateway);
            tokio::spawn(async move { fetch_brands(gateway.as_ref()).await })
        };

        let (vehicle, brands) = tokio::try_join!(joined(vehicle_task), joined(brands_task))?;
        Ok(EditContext { vehicle, brands })
    }

    /// Every vehicle with brand and features, newest first.
    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, WorkflowError> {
        let rows = self
            .gateway
            .query(&vehicle_query().order_by("created_at", false))
            .await?;
        let mut vehicles = decode_vehicles(rows)?;
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(vehicles)
    }

    /// Overwrite the editable fields of a vehicle.
    pub async fn update_vehicle(
        &self,
        id: &VehicleId,
        changes: VehicleChanges,
    ) -> Result<(), WorkflowError> {
        changes.validate()?;
        let fields = changes.into_row()?;
        self.gateway.update(CARS, &id.0, fields).await.map_err(|err| {
            warn!(vehicle_id = %id, error = %err, "vehicle update rejected");
            WorkflowError::from(err)
        })?;
        info!(vehicle_id = %id, "vehicle updated");
        Ok(())
    }

    pub async fn delete_vehicle(&self, id: &VehicleId) -> Result<(), WorkflowError> {
        self.gateway.delete(CARS, &id.0).await.map_err(|err| {
            warn!(vehicle_id = %id, error = %err, "vehicle delete rejected");
            WorkflowError::from(err)
        })?;
        info!(vehicle_id = %id, "vehicle deleted");
        Ok(())
    }

    /// Write `sold` as the new sale status. The value is stored as given, never derived from
    /// the current row, so concurrent writers resolve last-write-wins.
    pub async fn set_sold_status(&self, id: &VehicleId, sold: bool) -> Result<(), WorkflowError> {
        let mut fields = Map::new();
        fields.insert("is_sold".to_string(), Value::Bool(sold));
        self.gateway.update(CARS, &id.0, fields).await.map_err(|err| {
            warn!(vehicle_id = %id, sold, error = %err, "sale status update rejected");
            WorkflowError::from(err)
        })?;
        info!(vehicle_id = %id, status = sale_label(sold), "sale status written");
        Ok(())
    }
}

fn vehicle_query() -> QuerySpec {
    QuerySpec::from(CARS)
        .join(JoinSpec::to_one("brand", BRANDS, "brand_id", BRAND_COLUMNS))
        .join(JoinSpec::to_many(
            "features",
            CAR_FEATURES,
            "car_id",
            FEATURE_COLUMNS,
        ))
}

fn decode_vehicles(rows: Vec<Row>) -> Result<Vec<Vehicle>, StoreError> {
    decode_rows::<VehicleRow>(CARS, rows)?
        .into_iter()
        .map(VehicleRow::into_vehicle)
        .collect()
}

async fn fetch_vehicle<G>(gateway: &G, id: &VehicleId) -> Result<Vehicle, WorkflowError>
where
    G: DataStoreGateway + ?Sized,
{
    let rows = gateway.query(&vehicle_query().eq("id", id.0.clone())).await?;
    let mut vehicles = decode_vehicles(rows)?;
    match vehicles.len() {
        0 => Err(WorkflowError::not_found("vehicle", id.0.clone())),
        1 => Ok(vehicles.remove(0)),
        count => Err(StoreError::Integrity(format!("{count} vehicles share id {id}")).into()),
    }
}

async fn fetch_brands<G>(gateway: &G) -> Result<Vec<Brand>, WorkflowError>
where
    G: DataStoreGateway + ?Sized,
{
    let rows = gateway
        .query(&QuerySpec::from(BRANDS).order_by("name", true))
        .await?;
    let mut brands: Vec<Brand> = decode_rows(BRANDS, rows)?;
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(brands)
}

async fn joined<T>(task: JoinHandle<Result<T, WorkflowError>>) -> Result<T, WorkflowError> {
    match task.await {
        Ok(result) => result,
        Err(err) => Err(StoreError::Unavailable(format!("catalog fetch aborted: {err}")).into()),
    }
}
