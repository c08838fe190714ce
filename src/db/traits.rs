// Database trait: async interface for the catalog and history stores.
//
// Implementor: SqliteDatabase (wraps rusqlite). Methods are async so the web
// handlers can hold an `Arc<dyn Database>` without caring how the backend
// does its I/O.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Product, StoreStats};
use crate::catalog::PurchaseHistory;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    /// Insert the sample catalog and purchases if the catalog is empty.
    async fn seed_sample_data(&self) -> Result<bool>;

    // --- Catalog ---

    /// Save or update a product.
    async fn upsert_product(&self, product: &Product) -> Result<()>;

    /// Load the whole catalog in canonical order.
    async fn get_all_products(&self) -> Result<Vec<Product>>;

    /// Load the given products, in the order requested, skipping unknown ids.
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>>;

    // --- Purchase history ---

    /// Record a purchase. Returns false if it was already recorded.
    async fn record_purchase(&self, user_id: &str, product_id: &str) -> Result<bool>;

    /// Load one user's purchases as an in-memory history.
    async fn get_purchase_history(&self, user_id: &str) -> Result<PurchaseHistory>;

    // --- Stats ---

    /// Row counts for products, purchases and distinct users.
    async fn get_store_stats(&self) -> Result<StoreStats>;
}
