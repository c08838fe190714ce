// Database schema: table creation and migrations.
//
// A `schema_version` table tracks which migrations have run, and each
// migration is a function that executes SQL statements.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all tables if they don't exist yet.
///
/// This is idempotent, safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- The product catalog. Feature vectors and image lists are JSON arrays.
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            images TEXT NOT NULL DEFAULT '[]',
            features TEXT NOT NULL,
            position INTEGER NOT NULL,          -- catalog order (snapshot index)
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Purchase history: one row per (user, product) pair
        CREATE TABLE IF NOT EXISTS purchases (
            user_id TEXT NOT NULL,
            product_id TEXT NOT NULL,
            purchased_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, product_id)
        );

        -- Index for stable catalog ordering
        CREATE INDEX IF NOT EXISTS idx_products_position
            ON products(position);

        -- Index for finding who bought a product
        CREATE INDEX IF NOT EXISTS idx_purchases_product
            ON purchases(product_id);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
