// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across other .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Product, StoreStats};
use super::traits::Database;
use crate::catalog::PurchaseHistory;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn seed_sample_data(&self) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::seed::seed_if_empty(&conn)
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::upsert_product(&conn, product)
    }

    async fn get_all_products(&self) -> Result<Vec<Product>> {
        let conn = self.conn.lock().await;
        super::queries::get_all_products(&conn)
    }

    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>> {
        let conn = self.conn.lock().await;
        super::queries::get_products_by_ids(&conn, ids)
    }

    async fn record_purchase(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::record_purchase(&conn, user_id, product_id)
    }

    async fn get_purchase_history(&self, user_id: &str) -> Result<PurchaseHistory> {
        let conn = self.conn.lock().await;
        let product_ids = super::queries::get_user_purchases(&conn, user_id)?;
        Ok(product_ids
            .into_iter()
            .map(|product_id| (user_id, product_id))
            .collect())
    }

    async fn get_store_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;
        super::queries::get_store_stats(&conn)
    }
}
