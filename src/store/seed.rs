//! CSV seeding for the in-memory store.
//!
//! A seed directory may contain `brands.csv`, `cars.csv`, `car_features.csv` and
//! `private_listings.csv`. Missing files are skipped; tables load parents first so foreign
//! keys resolve.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use super::tables::{BRANDS, CARS, CAR_FEATURES, PRIVATE_LISTINGS};
use super::{encode_row, InMemoryStore, StoreError};

#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(StoreError),
    InvalidStatus(String),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Io(err) => write!(f, "failed to read seed file: {}", err),
            SeedError::Csv(err) => write!(f, "invalid seed CSV data: {}", err),
            SeedError::Store(err) => write!(f, "seed row rejected by store: {}", err),
            SeedError::InvalidStatus(status) => {
                write!(f, "unknown listing status '{}' in seed data", status)
            }
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Io(err) => Some(err),
            SeedError::Csv(err) => Some(err),
            SeedError::Store(err) => Some(err),
            SeedError::InvalidStatus(_) => None,
        }
    }
}

impl From<std::io::Error> for SeedError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SeedError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<StoreError> for SeedError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Seedable tables in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedTable {
    Brands,
    Cars,
    CarFeatures,
    PrivateListings,
}

impl SeedTable {
    pub const LOAD_ORDER: [SeedTable; 4] = [
        SeedTable::Brands,
        SeedTable::Cars,
        SeedTable::CarFeatures,
        SeedTable::PrivateListings,
    ];

    pub fn table(self) -> &'static str {
        match self {
            SeedTable::Brands => BRANDS,
            SeedTable::Cars => CARS,
            SeedTable::CarFeatures => CAR_FEATURES,
            SeedTable::PrivateListings => PRIVATE_LISTINGS,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SeedTable::Brands => "brands.csv",
            SeedTable::Cars => "cars.csv",
            SeedTable::CarFeatures => "car_features.csv",
            SeedTable::PrivateListings => "private_listings.csv",
        }
    }
}

/// Row counts loaded per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub brands: usize,
    pub cars: usize,
    pub features: usize,
    pub listings: usize,
}

impl SeedSummary {
    fn record(&mut self, table: SeedTable, count: usize) {
        match table {
            SeedTable::Brands => self.brands += count,
            SeedTable::Cars => self.cars += count,
            SeedTable::CarFeatures => self.features += count,
            SeedTable::PrivateListings => self.listings += count,
        }
    }
}

/// Load every seed file present in `dir` into `store`.
pub fn load_seed_dir(store: &InMemoryStore, dir: &Path) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();
    for table in SeedTable::LOAD_ORDER {
        let path = dir.join(table.file_name());
        if !path.exists() {
            continue;
        }
        let file = File::open(&path)?;
        let count = load_table(store, table, file)?;
        summary.record(table, count);
    }

    info!(dir = %dir.display(), ?summary, "seeded in-memory store");
    Ok(summary)
}

/// Load one CSV document into the matching table, returning the number of rows inserted.
pub fn load_table<R: Read>(
    store: &InMemoryStore,
    table: SeedTable,
    reader: R,
) -> Result<usize, SeedError> {
    match table {
        SeedTable::Brands => insert_rows::<BrandSeed, R>(store, table, reader),
        SeedTable::Cars => insert_rows::<CarSeed, R>(store, table, reader),
        SeedTable::CarFeatures => insert_rows::<FeatureSeed, R>(store, table, reader),
        SeedTable::PrivateListings => insert_rows::<ListingSeed, R>(store, table, reader),
    }
}

/// Store preloaded with a small showroom used by `serve` and `demo` when no seed directory is
/// configured.
pub fn sample_store() -> Result<InMemoryStore, SeedError> {
    let store = InMemoryStore::admin_schema();
    for (table, document) in [
        (SeedTable::Brands, SAMPLE_BRANDS),
        (SeedTable::Cars, SAMPLE_CARS),
        (SeedTable::CarFeatures, SAMPLE_FEATURES),
        (SeedTable::PrivateListings, SAMPLE_LISTINGS),
    ] {
        load_table(&store, table, Cursor::new(document))?;
    }
    Ok(store)
}

trait SeedRow: DeserializeOwned + Serialize {
    fn validate(&self) -> Result<(), SeedError> {
        Ok(())
    }
}

fn insert_rows<T: SeedRow, R: Read>(
    store: &InMemoryStore,
    table: SeedTable,
    reader: R,
) -> Result<usize, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut count = 0;

    for record in csv_reader.deserialize::<T>() {
        let seed = record?;
        seed.validate()?;
        let row = encode_row(table.table(), &seed)?;
        store.insert(table.table(), row)?;
        count += 1;
    }

    Ok(count)
}

#[derive(Debug, Serialize, Deserialize)]
struct BrandSeed {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    logo_url: Option<String>,
}

impl SeedRow for BrandSeed {}

#[derive(Debug, Serialize, Deserialize)]
struct CarSeed {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    brand_id: String,
    make: String,
    model: String,
    year: i32,
    price: u32,
    mileage: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    fuel_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    transmission: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    image_url: Option<String>,
    #[serde(default)]
    is_sold: bool,
    created_at: DateTime<Utc>,
}

impl SeedRow for CarSeed {}

#[derive(Debug, Serialize, Deserialize)]
struct FeatureSeed {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    car_id: String,
    name: String,
    available: bool,
}

impl SeedRow for FeatureSeed {}

#[derive(Debug, Serialize, Deserialize)]
struct ListingSeed {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    brand_id: String,
    make: String,
    model: String,
    year: i32,
    price: u32,
    mileage: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    seller_name: String,
    seller_email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    seller_phone: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl SeedRow for ListingSeed {
    fn validate(&self) -> Result<(), SeedError> {
        match self.status.as_str() {
            "pending" | "approved" | "rejected" => Ok(()),
            other => Err(SeedError::InvalidStatus(other.to_string())),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

const SAMPLE_BRANDS: &str = "\
id,name,logo_url
brand-volvo,Volvo,https://cdn.example.com/logos/volvo.svg
brand-audi,Audi,https://cdn.example.com/logos/audi.svg
brand-skoda,Skoda,
";

const SAMPLE_CARS: &str = "\
id,brand_id,make,model,year,price,mileage,fuel_type,transmission,description,image_url,is_sold,created_at
car-xc60,brand-volvo,Volvo,XC60,2021,38900,42000,hybrid,automatic,One owner with full service history,,false,2025-09-01T09:00:00Z
car-a4,brand-audi,Audi,A4 Avant,2019,24500,81000,diesel,automatic,,,false,2025-09-03T14:30:00Z
car-octavia,brand-skoda,Skoda,Octavia,2020,17900,65000,petrol,manual,Company car,,true,2025-08-20T08:15:00Z
";

const SAMPLE_FEATURES: &str = "\
id,car_id,name,available
feat-1,car-xc60,Adaptive cruise control,true
feat-2,car-xc60,Panoramic roof,true
feat-3,car-xc60,Tow bar,false
feat-4,car-a4,Heated seats,true
";

const SAMPLE_LISTINGS: &str = "\
id,brand_id,make,model,year,price,mileage,description,seller_name,seller_email,seller_phone,status,created_at
listing-1,brand-audi,Audi,Q5,2018,21000,98000,Winter tyres included,Jonna Lind,jonna@example.com,+46701234567,pending,2025-10-02T11:00:00Z
listing-2,brand-volvo,Volvo,V60,2017,15500,120000,,Erik Berg,erik@example.com,,approved,2025-09-28T16:45:00Z
listing-3,brand-skoda,Skoda,Superb,2022,29900,30000,Still under warranty,Sam Ek,sam@example.com,,pending,2025-10-05T08:20:00Z
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataStoreGateway, QuerySpec};

    #[tokio::test]
    async fn sample_store_loads_every_table() {
        let store = sample_store().expect("sample data loads");
        let cars = store
            .query(&QuerySpec::from(CARS))
            .await
            .expect("cars query");
        let listings = store
            .query(&QuerySpec::from(PRIVATE_LISTINGS))
            .await
            .expect("listings query");
        assert_eq!(cars.len(), 3);
        assert_eq!(listings.len(), 3);
    }

    #[test]
    fn load_table_rejects_unknown_listing_status() {
        let store = sample_store().expect("sample data loads");
        let csv = "brand_id,make,model,year,price,mileage,description,seller_name,seller_email,seller_phone,status,created_at\n\
                   brand-audi,Audi,A3,2016,9000,150000,,Kim,kim@example.com,,archived,2025-10-01T10:00:00Z\n";

        match load_table(&store, SeedTable::PrivateListings, Cursor::new(csv)) {
            Err(SeedError::InvalidStatus(status)) => assert_eq!(status, "archived"),
            other => panic!("expected invalid status, got {other:?}"),
        }
    }

    #[test]
    fn load_table_assigns_ids_and_blank_optionals() {
        let store = InMemoryStore::admin_schema();
        let count = load_table(
            &store,
            SeedTable::Brands,
            Cursor::new("id,name,logo_url\n,Saab,\n"),
        )
        .expect("brand loads");
        assert_eq!(count, 1);
    }

    #[test]
    fn load_table_surfaces_foreign_key_faults() {
        let store = InMemoryStore::admin_schema();
        let csv = "id,car_id,name,available\nf1,missing-car,Sunroof,true\n";
        assert!(matches!(
            load_table(&store, SeedTable::CarFeatures, Cursor::new(csv)),
            Err(SeedError::Store(StoreError::Constraint(_)))
        ));
    }
}
