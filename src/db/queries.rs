// Database queries: CRUD operations for the catalog and purchase history.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::models::{Product, StoreStats};

// --- Products ---

/// Raw product row before the JSON columns are decoded.
struct ProductRow {
    id: String,
    name: String,
    category: String,
    price: f64,
    images: String,
    features: String,
}

impl ProductRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            price: row.get(3)?,
            images: row.get(4)?,
            features: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Product> {
        let features: Vec<f64> = serde_json::from_str(&self.features)
            .with_context(|| format!("Corrupt feature vector for product {}", self.id))?;
        // A bad image list only loses display data, so it isn't fatal.
        let images: Vec<String> = match serde_json::from_str(&self.images) {
            Ok(images) => images,
            Err(e) => {
                warn!(product_id = %self.id, error = %e, "Corrupt image list, showing none");
                Vec::new()
            }
        };
        Ok(Product {
            id: self.id,
            name: self.name,
            category: self.category,
            price: self.price,
            images,
            features,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, category, price, images, features";

/// Insert or update a product. New products are appended to the catalog
/// order; updates keep their existing position.
pub fn upsert_product(conn: &Connection, product: &Product) -> Result<()> {
    let images_json = serde_json::to_string(&product.images)?;
    let features_json = serde_json::to_string(&product.features)?;
    conn.execute(
        "INSERT INTO products (id, name, category, price, images, features, position, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                 (SELECT COALESCE(MAX(position), -1) + 1 FROM products),
                 datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            name = ?2,
            category = ?3,
            price = ?4,
            images = ?5,
            features = ?6,
            updated_at = datetime('now')",
        params![
            product.id,
            product.name,
            product.category,
            product.price,
            images_json,
            features_json,
        ],
    )?;
    Ok(())
}

/// Load the whole catalog in canonical order.
pub fn get_all_products(conn: &Connection) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY position, id"
    ))?;
    let rows = stmt.query_map([], ProductRow::from_row)?;

    let mut products = Vec::new();
    for row in rows {
        products.push(row?.decode()?);
    }
    Ok(products)
}

/// Look up one product by id.
pub fn get_product(conn: &Connection, id: &str) -> Result<Option<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))?;
    let row = stmt
        .query_row(params![id], ProductRow::from_row)
        .optional()?;
    row.map(ProductRow::decode).transpose()
}

/// Look up several products, in the order given. Missing ids are skipped.
pub fn get_products_by_ids(conn: &Connection, ids: &[String]) -> Result<Vec<Product>> {
    let mut products = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(product) = get_product(conn, id)? {
            products.push(product);
        }
    }
    Ok(products)
}

// --- Purchases ---

/// Record a purchase. Returns false if the pair was already recorded.
///
/// The product must exist in the catalog.
pub fn record_purchase(conn: &Connection, user_id: &str, product_id: &str) -> Result<bool> {
    if get_product(conn, product_id)?.is_none() {
        anyhow::bail!("Product {product_id} is not in the catalog");
    }
    let changed = conn.execute(
        "INSERT OR IGNORE INTO purchases (user_id, product_id) VALUES (?1, ?2)",
        params![user_id, product_id],
    )?;
    Ok(changed > 0)
}

/// All product ids a user has purchased, sorted.
pub fn get_user_purchases(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT product_id FROM purchases WHERE user_id = ?1 ORDER BY product_id")?;
    let rows = stmt.query_map(params![user_id], |row| row.get(0))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row?);
    }
    Ok(ids)
}

// --- Stats ---

pub fn get_store_stats(conn: &Connection) -> Result<StoreStats> {
    let products: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
    let purchases: i64 = conn.query_row("SELECT COUNT(*) FROM purchases", [], |row| row.get(0))?;
    let users: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT user_id) FROM purchases",
        [],
        |row| row.get(0),
    )?;
    Ok(StoreStats {
        products,
        purchases,
        users,
    })
}
