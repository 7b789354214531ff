//! Data store gateway contract consumed by the catalog and moderation workflows.
//!
//! The workflows only ever speak four shapes to the store: a relational query with joins and
//! ordering, a single-row update, a single-row delete, and a named remote procedure. Rows travel
//! as JSON objects so the same contract fits a PostgREST-style backend and the in-memory store.

mod memory;
pub mod seed;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use memory::{ForeignKey, InMemoryStore, OnDelete};

/// A single row as returned by the store, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Table and procedure names shared by the workflows and the reference store.
pub mod tables {
    pub const BRANDS: &str = "brands";
    pub const CARS: &str = "cars";
    pub const CAR_FEATURES: &str = "car_features";
    pub const PRIVATE_LISTINGS: &str = "private_listings";

    pub const PROCESS_PRIVATE_LISTING: &str = "process_private_listing";
}

/// Gateway-level failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed query: {0}")]
    Query(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("procedure {name} failed: {message}")]
    Procedure { name: String, message: String },
    /// The procedure ran and refused the request given the current row state.
    #[error("procedure {name} rejected: {message}")]
    Rejected { name: String, message: String },
    #[error("malformed row from {table}: {message}")]
    Malformed { table: String, message: String },
    #[error("data integrity fault: {0}")]
    Integrity(String),
}

/// Equality predicate applied before joins.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Direction of an embedded relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `row[foreign_key]` points at `table.id`; embeds one object or null.
    ToOne,
    /// `table[foreign_key]` points back at `row.id`; embeds an array in insertion order.
    ToMany,
}

/// Embedded relation, projected to `columns` and stored under `alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub alias: String,
    pub table: String,
    pub kind: JoinKind,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

impl JoinSpec {
    pub fn to_one(alias: &str, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        Self::build(alias, table, JoinKind::ToOne, foreign_key, columns)
    }

    pub fn to_many(alias: &str, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        Self::build(alias, table, JoinKind::ToMany, foreign_key, columns)
    }

    fn build(
        alias: &str,
        table: &str,
        kind: JoinKind,
        foreign_key: &str,
        columns: &[&str],
    ) -> Self {
        Self {
            alias: alias.to_string(),
            table: table.to_string(),
            kind,
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub column: String,
    pub ascending: bool,
}

/// Select from one table with optional filters, embedded relations and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub table: String,
    pub filters: Vec<Filter>,
    pub joins: Vec<JoinSpec>,
    pub order: Option<OrderSpec>,
}

impl QuerySpec {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            joins: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(OrderSpec {
            column: column.to_string(),
            ascending,
        });
        self
    }
}

/// Access point to the relational store backing the back office.
#[async_trait]
pub trait DataStoreGateway: Send + Sync {
    async fn query(&self, spec: &QuerySpec) -> Result<Vec<Row>, StoreError>;
    async fn update(&self, table: &str, id: &str, fields: Row) -> Result<(), StoreError>;
    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError>;
    async fn call_procedure(&self, name: &str, args: Row) -> Result<(), StoreError>;
}

/// Decode store rows into typed records, naming the table on failure.
pub(crate) fn decode_rows<T: DeserializeOwned>(
    table: &str,
    rows: Vec<Row>,
) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(Value::Object(row)).map_err(|err| StoreError::Malformed {
                table: table.to_string(),
                message: err.to_string(),
            })
        })
        .collect()
}

/// Encode a serializable record as a row. Non-object encodings are rejected.
pub(crate) fn encode_row<T: Serialize>(table: &str, value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Malformed {
            table: table.to_string(),
            message: format!("expected an object, got {other}"),
        }),
        Err(err) => Err(StoreError::Malformed {
            table: table.to_string(),
            message: err.to_string(),
        }),
    }
}

/// Column ordering used by the reference store. Nulls sort first; RFC 3339 strings compare
/// chronologically.
pub(crate) fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or_default();
            let b = b.as_f64().unwrap_or_default();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}
