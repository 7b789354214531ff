use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use super::tables::{BRANDS, CARS, CAR_FEATURES, PRIVATE_LISTINGS, PROCESS_PRIVATE_LISTING};
use super::{compare_values, DataStoreGateway, JoinKind, JoinSpec, QuerySpec, Row, StoreError};

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Restrict,
    Cascade,
}

/// `table.column` references `references.id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: BTreeMap<String, Vec<Row>>,
    foreign_keys: Vec<ForeignKey>,
    sequence: u64,
}

/// Relational store held in process memory.
///
/// Tables keep insertion order, joins behave like PostgREST embeds (to-one embeds are left
/// joins that yield `null`), and foreign keys are enforced on insert, update and delete. Every
/// operation runs under one lock, so the listing procedure is atomic.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new(tables: &[&str], foreign_keys: Vec<ForeignKey>) -> Self {
        let state = StoreState {
            tables: tables
                .iter()
                .map(|table| (table.to_string(), Vec::new()))
                .collect(),
            foreign_keys,
            sequence: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Empty store with the back office tables and their relations.
    pub fn admin_schema() -> Self {
        Self::new(
            &[BRANDS, CARS, CAR_FEATURES, PRIVATE_LISTINGS],
            vec![
                ForeignKey {
                    table: CARS,
                    column: "brand_id",
                    references: BRANDS,
                    on_delete: OnDelete::Restrict,
                },
                ForeignKey {
                    table: CAR_FEATURES,
                    column: "car_id",
                    references: CARS,
                    on_delete: OnDelete::Cascade,
                },
                ForeignKey {
                    table: PRIVATE_LISTINGS,
                    column: "brand_id",
                    references: BRANDS,
                    on_delete: OnDelete::Restrict,
                },
            ],
        )
    }

    /// Insert a row, assigning an `id` when the row carries none. Used for seeding and by
    /// the third-party submission path, which sits outside the admin gateway contract.
    pub fn insert(&self, table: &str, mut row: Row) -> Result<Row, StoreError> {
        let mut state = self.lock()?;
        if !state.tables.contains_key(table) {
            return Err(unknown_table(table));
        }

        let has_id = matches!(row.get("id"), Some(Value::String(id)) if !id.is_empty());
        if !has_id {
            let id = state.free_id(table);
            row.insert("id".to_string(), Value::String(id));
        }

        let id = row.get("id").cloned().unwrap_or(Value::Null);
        if state.position(table, &id).is_some() {
            return Err(StoreError::Constraint(format!(
                "duplicate key {id} in {table}"
            )));
        }

        state.check_references(table, &row)?;
        state.rows_mut(table)?.push(row.clone());
        Ok(row)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn process_private_listing(&self, args: &Row) -> Result<(), StoreError> {
        let listing_id = args
            .get("p_listing_id")
            .and_then(Value::as_str)
            .ok_or_else(|| procedure_error("p_listing_id is required"))?;
        let status = args
            .get("p_status")
            .and_then(Value::as_str)
            .ok_or_else(|| procedure_error("p_status is required"))?;
        if status != "approved" && status != "rejected" {
            return Err(procedure_error(&format!("invalid status '{status}'")));
        }

        let mut state = self.lock()?;
        let key = Value::String(listing_id.to_string());
        let position = state
            .position(PRIVATE_LISTINGS, &key)
            .ok_or_else(|| rejection(&format!("listing {listing_id} not found")))?;
        let listing = state.rows(PRIVATE_LISTINGS)?[position].clone();

        let current = listing.get("status").and_then(Value::as_str).unwrap_or("");
        if current != "pending" {
            return Err(rejection(&format!(
                "listing {listing_id} already {current}"
            )));
        }

        if status == "approved" {
            let mut car = Row::new();
            car.insert("id".to_string(), Value::String(state.free_id(CARS)));
            for column in [
                "brand_id",
                "make",
                "model",
                "year",
                "price",
                "mileage",
                "description",
            ] {
                car.insert(
                    column.to_string(),
                    listing.get(column).cloned().unwrap_or(Value::Null),
                );
            }
            car.insert("is_sold".to_string(), Value::Bool(false));
            car.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
            state.check_references(CARS, &car)?;
            info!(%listing_id, car_id = ?car.get("id"), "promoted approved listing into catalog");
            state.rows_mut(CARS)?.push(car);
        }

        let rows = state.rows_mut(PRIVATE_LISTINGS)?;
        rows[position].insert("status".to_string(), Value::String(status.to_string()));
        Ok(())
    }
}

impl StoreState {
    fn rows(&self, table: &str) -> Result<&Vec<Row>, StoreError> {
        self.tables.get(table).ok_or_else(|| unknown_table(table))
    }

    fn rows_mut(&mut self, table: &str) -> Result<&mut Vec<Row>, StoreError> {
        self.tables.get_mut(table).ok_or_else(|| unknown_table(table))
    }

    fn position(&self, table: &str, id: &Value) -> Option<usize> {
        self.tables
            .get(table)?
            .iter()
            .position(|row| row.get("id") == Some(id))
    }

    fn next_id(&mut self, table: &str) -> String {
        self.sequence += 1;
        format!("{table}-{:06}", self.sequence)
    }

    /// Next sequence id not already taken by a seeded row.
    fn free_id(&mut self, table: &str) -> String {
        loop {
            let id = self.next_id(table);
            if self.position(table, &Value::String(id.clone())).is_none() {
                return id;
            }
        }
    }

    fn check_references(&self, table: &str, row: &Row) -> Result<(), StoreError> {
        for key in self.foreign_keys.iter().filter(|key| key.table == table) {
            match row.get(key.column) {
                None | Some(Value::Null) => continue,
                Some(value) => {
                    if self.position(key.references, value).is_none() {
                        return Err(StoreError::Constraint(format!(
                            "{table}.{} references missing {} {value}",
                            key.column, key.references
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn embed(&self, row: &Row, join: &JoinSpec) -> Result<Value, StoreError> {
        let target = self.rows(&join.table)?;
        let embedded = match join.kind {
            JoinKind::ToOne => match row.get(&join.foreign_key) {
                None | Some(Value::Null) => Value::Null,
                Some(key) => target
                    .iter()
                    .find(|candidate| candidate.get("id") == Some(key))
                    .map(|candidate| Value::Object(project(candidate, &join.columns)))
                    .unwrap_or(Value::Null),
            },
            JoinKind::ToMany => {
                let id = row.get("id");
                Value::Array(
                    target
                        .iter()
                        .filter(|candidate| id.is_some() && candidate.get(&join.foreign_key) == id)
                        .map(|candidate| Value::Object(project(candidate, &join.columns)))
                        .collect(),
                )
            }
        };
        Ok(embedded)
    }
}

fn project(row: &Row, columns: &[String]) -> Row {
    if columns.is_empty() {
        return row.clone();
    }
    columns
        .iter()
        .map(|column| {
            (
                column.clone(),
                row.get(column).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

fn unknown_table(table: &str) -> StoreError {
    StoreError::Query(format!("relation \"{table}\" does not exist"))
}

fn procedure_error(message: &str) -> StoreError {
    StoreError::Procedure {
        name: PROCESS_PRIVATE_LISTING.to_string(),
        message: message.to_string(),
    }
}

fn rejection(message: &str) -> StoreError {
    StoreError::Rejected {
        name: PROCESS_PRIVATE_LISTING.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl DataStoreGateway for InMemoryStore {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Row>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<Row> = state
            .rows(&spec.table)?
            .iter()
            .filter(|row| {
                spec.filters
                    .iter()
                    .all(|filter| row.get(&filter.column) == Some(&filter.value))
            })
            .cloned()
            .collect();

        for row in &mut rows {
            for join in &spec.joins {
                let embedded = state.embed(row, join)?;
                row.insert(join.alias.clone(), embedded);
            }
        }

        if let Some(order) = &spec.order {
            rows.sort_by(|left, right| {
                let ordering = compare_values(left.get(&order.column), right.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        debug!(table = %spec.table, rows = rows.len(), "query served");
        Ok(rows)
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let key = Value::String(id.to_string());
        let Some(position) = state.position(table, &key) else {
            state.rows(table)?;
            return Ok(());
        };

        let mut updated = state.rows(table)?[position].clone();
        for (column, value) in fields {
            if column == "id" {
                continue;
            }
            updated.insert(column, value);
        }
        state.check_references(table, &updated)?;
        state.rows_mut(table)?[position] = updated;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let key = Value::String(id.to_string());
        let Some(position) = state.position(table, &key) else {
            state.rows(table)?;
            return Ok(());
        };

        let dependents: Vec<ForeignKey> = state
            .foreign_keys
            .iter()
            .filter(|fk| fk.references == table)
            .cloned()
            .collect();

        for fk in &dependents {
            let referenced = state
                .rows(fk.table)?
                .iter()
                .any(|row| row.get(fk.column) == Some(&key));
            if referenced && fk.on_delete == OnDelete::Restrict {
                return Err(StoreError::Constraint(format!(
                    "{table} {id} is still referenced by {}.{}",
                    fk.table, fk.column
                )));
            }
        }

        for fk in dependents
            .iter()
            .filter(|fk| fk.on_delete == OnDelete::Cascade)
        {
            state
                .rows_mut(fk.table)?
                .retain(|row| row.get(fk.column) != Some(&key));
        }

        state.rows_mut(table)?.remove(position);
        Ok(())
    }

    async fn call_procedure(&self, name: &str, args: Row) -> Result<(), StoreError> {
        match name {
            PROCESS_PRIVATE_LISTING => self.process_private_listing(&args),
            other => Err(StoreError::Procedure {
                name: other.to_string(),
                message: "function does not exist".to_string(),
            }),
        }
    }
}
