// System status display: store row counts and whether the catalog indexes.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::{self, Database};
use crate::engine::EngineSnapshot;
use crate::output::terminal;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_path: &str) -> Result<()> {
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    let db_display = format!("{db_path} ({file_size})");

    let stats = db.get_store_stats().await?;

    // Build a throwaway snapshot to report whether the catalog is servable.
    let snapshot = match db::load_catalog(db.as_ref()).await {
        Ok(catalog) => match EngineSnapshot::build(catalog, 0) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                println!("Index error: {e}");
                None
            }
        },
        Err(e) => {
            println!("Index error: {e:#}");
            None
        }
    };

    terminal::display_status(&db_display, &stats, snapshot.as_ref());

    if stats.products == 0 {
        println!("\nThe catalog is empty. Run `recommender init --seed` or `recommender import`.");
    }

    Ok(())
}

/// Database existence check, separate so `status` can say something useful.
pub fn database_exists(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    match bytes {
        b if b < 1024 => format!("{b} B"),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}
