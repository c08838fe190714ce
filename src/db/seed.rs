// Sample catalog and purchase history for `recommender init --seed`.
//
// Ten products across three categories, each with three features, and four
// users whose purchases stay inside one category. Seeding only happens when
// the products table is empty, so it never clobbers a real catalog.

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use super::models::{Product, Purchase};
use super::queries;

fn product(id: &str, name: &str, category: &str, price: f64, features: [f64; 3]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        price,
        images: Vec::new(),
        features: features.to_vec(),
    }
}

/// The sample catalog, in catalog order.
pub fn sample_products() -> Vec<Product> {
    vec![
        product("1", "Smartphone Premium", "Electronics", 999.99, [0.9, 0.7, 0.8]),
        product("2", "Laptop Pro", "Electronics", 1299.99, [0.8, 0.9, 0.7]),
        product("3", "Wireless Headphones", "Electronics", 199.99, [0.6, 0.6, 0.9]),
        product("4", "Smartwatch", "Electronics", 249.99, [0.7, 0.5, 0.6]),
        product("5", "Coffee Maker", "Home", 79.99, [0.2, 0.3, 0.1]),
        product("6", "Blender", "Home", 49.99, [0.3, 0.2, 0.2]),
        product("7", "Toaster", "Home", 29.99, [0.1, 0.1, 0.3]),
        product("8", "Running Shoes", "Sports", 129.99, [0.5, 0.8, 0.5]),
        product("9", "Yoga Mat", "Sports", 39.99, [0.4, 0.7, 0.4]),
        product("10", "Dumbbell Set", "Sports", 149.99, [0.6, 0.9, 0.6]),
    ]
}

/// The sample purchase history.
pub fn sample_purchases() -> Vec<Purchase> {
    [
        ("user1", "1"),
        ("user1", "3"),
        ("user1", "4"),
        ("user2", "2"),
        ("user2", "4"),
        ("user3", "5"),
        ("user3", "6"),
        ("user3", "7"),
        ("user4", "8"),
        ("user4", "9"),
        ("user4", "10"),
    ]
    .into_iter()
    .map(|(user_id, product_id)| Purchase {
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
    })
    .collect()
}

/// Insert the sample data if the catalog is empty.
///
/// Returns true if anything was inserted.
pub fn seed_if_empty(conn: &Connection) -> Result<bool> {
    let existing = queries::get_store_stats(conn)?.products;
    if existing > 0 {
        info!(existing, "Catalog already has products, skipping seed");
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;
    let products = sample_products();
    for product in &products {
        queries::upsert_product(&tx, product)?;
    }
    let purchases = sample_purchases();
    for purchase in &purchases {
        queries::record_purchase(&tx, &purchase.user_id, &purchase.product_id)?;
    }
    tx.commit()?;

    info!(
        products = products.len(),
        purchases = purchases.len(),
        "Seeded sample catalog"
    );
    Ok(true)
}
