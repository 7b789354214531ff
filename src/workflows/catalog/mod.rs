//! Catalog vehicles and the brand lookup list.

pub mod domain;
pub mod repository;

pub use domain::{Brand, BrandId, EditContext, Feature, Vehicle, VehicleChanges, VehicleId};
pub use repository::CatalogRepository;
