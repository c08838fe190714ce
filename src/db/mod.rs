// Database layer: SQLite storage for the product catalog and purchase history.
//
// We use rusqlite with the "bundled" feature so there's no system SQLite
// dependency. The database file lives wherever RECOMMENDER_DB_PATH points
// (defaults to ./recommender.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod traits;

pub use traits::Database;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::catalog::{CatalogSnapshot, Entity};

/// Open (or create) the database and run migrations.
///
/// This is the main entry point, called by `recommender init` and by any
/// command that needs database access.
pub fn initialize(db_path: &str) -> Result<Connection> {
    // Create parent directories if needed
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for database: {}", db_path))?;
        }
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    // Enable WAL mode for better concurrent read performance
    conn.pragma_update(None, "journal_mode", "WAL")?;

    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Open an existing database (fails if it doesn't exist yet).
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!(
            "Database not found at {}. Run `recommender init` first.",
            db_path
        );
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    // Older files may predate a table; creation is idempotent.
    schema::create_tables(&conn)?;

    Ok(conn)
}

/// Create the database if needed and wrap it in the Database trait.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Open an existing database behind the Database trait.
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = open(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// A throwaway in-memory database with the schema applied.
pub fn initialize_in_memory() -> Result<Arc<dyn Database>> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Open the database, retrying with a linearly growing delay.
///
/// Attempt `n` (1-based) that fails waits `base_delay * n` before the next
/// one. Used by the server at startup, where the database volume may not be
/// ready yet.
pub async fn connect_with_retry(
    db_path: &str,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<Arc<dyn Database>> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        info!(attempt, max_attempts, db_path, "Opening database");
        match open_sqlite(db_path) {
            Ok(db) => return Ok(db),
            Err(e) if attempt < max_attempts => {
                let wait = base_delay * attempt;
                warn!(error = %e, attempt, wait_secs = wait.as_secs(), "Database unavailable, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Could not open database after {max_attempts} attempts")
                });
            }
        }
    }
}

/// Build a catalog snapshot from everything in the store.
pub async fn load_catalog(db: &dyn Database) -> Result<CatalogSnapshot> {
    let products = db.get_all_products().await?;
    let entities: Vec<Entity> = products.iter().map(Entity::from).collect();
    let snapshot = CatalogSnapshot::new(entities).context("Catalog cannot be indexed")?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        let missing = std::env::temp_dir()
            .join("recommender-missing-dir-for-retry-test")
            .join("nothing.db");
        let result = connect_with_retry(
            missing.to_str().unwrap(),
            3,
            Duration::from_millis(1),
        )
        .await;
        let err = result.err().unwrap();
        assert!(err.to_string().contains("after 3 attempts"));
    }

    #[tokio::test]
    async fn test_load_catalog_from_seeded_store() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        let db = sqlite::SqliteDatabase::new(conn);
        db.seed_sample_data().await.unwrap();

        let catalog = load_catalog(&db).await.unwrap();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.dimension(), 3);
        assert_eq!(catalog.index_of("1"), Some(0));
    }

    #[tokio::test]
    async fn test_load_catalog_rejects_mixed_dimensions() {
        let conn = Connection::open_in_memory().unwrap();
        schema::create_tables(&conn).unwrap();
        let db = sqlite::SqliteDatabase::new(conn);
        for (id, features) in [("a", vec![1.0, 0.0]), ("b", vec![1.0])] {
            db.upsert_product(&models::Product {
                id: id.to_string(),
                name: id.to_string(),
                category: String::new(),
                price: 0.0,
                images: vec![],
                features,
            })
            .await
            .unwrap();
        }
        assert!(load_catalog(&db).await.is_err());
    }
}
