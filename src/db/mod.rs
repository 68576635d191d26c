//! Local store adapter over SQLite.
//!
//! Records are stored one table per [`RecordKind`](drypos_core::RecordKind)
//! with the record serialized to JSON. Reads return owned copies; writes go
//! through [`LocalStore::transact`].

mod business_repo;
mod category_repo;
mod customer_repo;
mod employee_repo;
mod error;
mod filter;
mod order_repo;
mod product_repo;
mod store;

pub use business_repo::BusinessRepository;
pub use category_repo::CategoryRepository;
pub use customer_repo::CustomerRepository;
pub use employee_repo::EmployeeRepository;
pub use error::StoreError;
pub use filter::{Filter, FilterValue};
pub use order_repo::{OrderRepository, OrderSummary};
pub use product_repo::ProductRepository;
pub use store::{LocalStore, StoreCell, Tx};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Opens the database connection pool and runs migrations.
///
/// Safe to call repeatedly for the same file; migrations that already ran
/// are skipped.
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoreError::Unavailable(format!(
                "cannot create database directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("cannot open '{}': {}", path.display(), e))
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("schema migration failed: {}", e)))?;

    tracing::debug!(path = %path.display(), "Opened local store");
    Ok(pool)
}
