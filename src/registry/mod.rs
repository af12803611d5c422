//! Car registry persistence
//!
//! The registry is the only part of the agent that touches storage. Records
//! are keyed by VIN and are write-once: a second create for the same VIN is
//! rejected by the store itself, never merged into the existing row.

pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use sqlite::SqliteRecordStore;

/// A stored car profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRecord {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// Fields for a car that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCar {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl NewCar {
    pub fn new(
        vin: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            vin: vin.into(),
            make: make.into(),
            model: model.into(),
            year,
        }
    }
}

impl From<NewCar> for CarRecord {
    fn from(car: NewCar) -> Self {
        CarRecord {
            vin: car.vin,
            make: car.make,
            model: car.model,
            year: car.year,
        }
    }
}

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A car with VIN {vin} already exists")]
    DuplicateKey { vin: String },

    #[error("VIN must not be empty")]
    EmptyVin,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this error is a rejected write the user can recover from
    /// by saying something different next turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. } | StoreError::EmptyVin)
    }
}

/// Durable VIN-keyed storage for car records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, returning it unchanged.
    ///
    /// Fails with [`StoreError::DuplicateKey`] if the VIN is already taken.
    async fn create(&self, car: NewCar) -> Result<CarRecord, StoreError>;

    /// Find a record by VIN. A miss is `Ok(None)`, not an error.
    async fn lookup(&self, vin: &str) -> Result<Option<CarRecord>, StoreError>;
}
