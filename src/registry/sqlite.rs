//! SQLite-backed car registry
//!
//! One table, VIN as primary key. Uniqueness is left entirely to SQLite so
//! two racing creates for the same VIN cannot both succeed.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{CarRecord, NewCar, RecordStore, StoreError};

// SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE extended result codes
const PRIMARY_KEY_VIOLATION: &str = "1555";
const UNIQUE_VIOLATION: &str = "2067";

/// Record store over an SQLite database file
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (or create) the registry database at the given path
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        // every connection to sqlite::memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS cars (
                vin TEXT PRIMARY KEY,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Close the underlying pool, waiting for connections to finish
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || matches!(
                    db_err.code().as_deref(),
                    Some(PRIMARY_KEY_VIOLATION) | Some(UNIQUE_VIOLATION)
                )
        }
        _ => false,
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, car: NewCar) -> Result<CarRecord, StoreError> {
        if car.vin.is_empty() {
            return Err(StoreError::EmptyVin);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO cars (vin, make, model, year)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&car.vin)
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(car.into()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateKey { vin: car.vin }),
            Err(e) => Err(StoreError::Storage(e)),
        }
    }

    async fn lookup(&self, vin: &str) -> Result<Option<CarRecord>, StoreError> {
        let row: Option<(String, String, String, i32)> = sqlx::query_as(
            r#"
            SELECT vin, make, model, year
            FROM cars
            WHERE vin = ?
            "#,
        )
        .bind(vin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(vin, make, model, year)| CarRecord {
            vin,
            make,
            model,
            year,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const VIN: &str = "1HGCM82633A004352";

    #[tokio::test]
    async fn test_lookup_missing_vin() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();
        assert!(store.lookup(VIN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_lookup() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();

        let created = store
            .create(NewCar::new(VIN, "Honda", "Accord", 2003))
            .await
            .unwrap();
        assert_eq!(created.vin, VIN);

        let found = store.lookup(VIN).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.make, "Honda");
        assert_eq!(found.model, "Accord");
        assert_eq!(found.year, 2003);
    }

    #[tokio::test]
    async fn test_duplicate_vin_keeps_first_record() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();

        store
            .create(NewCar::new(VIN, "Honda", "Accord", 2003))
            .await
            .unwrap();

        let err = store
            .create(NewCar::new(VIN, "Toyota", "Camry", 2010))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { ref vin } if vin == VIN));

        let found = store.lookup(VIN).await.unwrap().unwrap();
        assert_eq!(found.make, "Honda");
        assert_eq!(found.year, 2003);
    }

    #[tokio::test]
    async fn test_empty_vin_rejected() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();
        let err = store
            .create(NewCar::new("", "Honda", "Accord", 2003))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyVin));
    }

    #[tokio::test]
    async fn test_vin_is_case_sensitive() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();
        store
            .create(NewCar::new(VIN, "Honda", "Accord", 2003))
            .await
            .unwrap();

        assert!(store.lookup(&VIN.to_lowercase()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_repeated_lookup_is_stable() {
        let store = SqliteRecordStore::open_in_memory().await.unwrap();
        store
            .create(NewCar::new(VIN, "Honda", "Accord", 2003))
            .await
            .unwrap();

        let first = store.lookup(VIN).await.unwrap();
        let second = store.lookup(VIN).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_concurrent_creates_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteRecordStore::open(&dir.path().join("race.sqlite"))
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .create(NewCar::new(VIN, "Honda", format!("Model{}", i), 2003))
                    .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(StoreError::DuplicateKey { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auto_db.sqlite");

        let store = SqliteRecordStore::open(&path).await.unwrap();
        store
            .create(NewCar::new(VIN, "Honda", "Accord", 2003))
            .await
            .unwrap();
        store.close().await;

        let reopened = SqliteRecordStore::open(&path).await.unwrap();
        let found = reopened.lookup(VIN).await.unwrap().unwrap();
        assert_eq!(found.model, "Accord");
    }
}
