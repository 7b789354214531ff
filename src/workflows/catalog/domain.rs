use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{encode_row, tables, Row, StoreError};
use crate::workflows::error::WorkflowError;

/// Identifier wrapper for catalog vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(pub String);

/// Read-only brand lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Optional equipment attached to a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub name: String,
    pub available: bool,
}

/// Catalog vehicle with its brand and features resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub brand_id: BrandId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u32,
    pub mileage: u32,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_sold: bool,
    pub created_at: DateTime<Utc>,
    pub brand: Brand,
    pub features: Vec<Feature>,
}

impl Vehicle {
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    pub fn sale_label(&self) -> &'static str {
        sale_label(self.is_sold)
    }
}

pub(crate) fn sale_label(sold: bool) -> &'static str {
    if sold {
        "sold"
    } else {
        "available"
    }
}

/// Shape of a `cars` row with its embeds. The brand embed is a left join on the wire, so a
/// missing brand shows up as `null` and is rejected in [`VehicleRow::into_vehicle`].
#[derive(Debug, Deserialize)]
pub(crate) struct VehicleRow {
    id: VehicleId,
    brand_id: BrandId,
    make: String,
    model: String,
    year: i32,
    price: u32,
    mileage: u32,
    #[serde(default)]
    fuel_type: Option<String>,
    #[serde(default)]
    transmission: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    is_sold: bool,
    created_at: DateTime<Utc>,
    brand: Option<Brand>,
    #[serde(default)]
    features: Vec<Feature>,
}

impl VehicleRow {
    pub(crate) fn into_vehicle(self) -> Result<Vehicle, StoreError> {
        let Some(brand) = self.brand else {
            return Err(StoreError::Integrity(format!(
                "vehicle {} references brand {} which could not be resolved",
                self.id.0, self.brand_id.0
            )));
        };

        Ok(Vehicle {
            id: self.id,
            brand_id: self.brand_id,
            make: self.make,
            model: self.model,
            year: self.year,
            price: self.price,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            description: self.description,
            image_url: self.image_url,
            is_sold: self.is_sold,
            created_at: self.created_at,
            brand,
            features: self.features,
        })
    }
}

/// Vehicle plus the brand list the edit form picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditContext {
    pub vehicle: Vehicle,
    pub brands: Vec<Brand>,
}

/// Editable catalog fields. Every field is written on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleChanges {
    pub brand_id: BrandId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: u32,
    pub mileage: u32,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// First production motor car; nothing older belongs in the catalog.
const EARLIEST_MODEL_YEAR: i32 = 1886;

impl VehicleChanges {
    pub fn from_vehicle(vehicle: &Vehicle) -> Self {
        Self {
            brand_id: vehicle.brand_id.clone(),
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            year: vehicle.year,
            price: vehicle.price,
            mileage: vehicle.mileage,
            fuel_type: vehicle.fuel_type.clone(),
            transmission: vehicle.transmission.clone(),
            description: vehicle.description.clone(),
            image_url: vehicle.image_url.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.brand_id.0.trim().is_empty() {
            return Err(WorkflowError::Validation("brand is required".to_string()));
        }
        if self.make.trim().is_empty() {
            return Err(WorkflowError::Validation("make is required".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(WorkflowError::Validation("model is required".to_string()));
        }

        let latest = Utc::now().year() + 1;
        if !(EARLIEST_MODEL_YEAR..=latest).contains(&self.year) {
            return Err(WorkflowError::Validation(format!(
                "year must be between {EARLIEST_MODEL_YEAR} and {latest}"
            )));
        }
        Ok(())
    }

    pub(crate) fn into_row(self) -> Result<Row, StoreError> {
        encode_row(tables::CARS, &self)
    }
}
