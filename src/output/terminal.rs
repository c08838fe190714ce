// Colored terminal output for recommendation lists and store status.

use colored::Colorize;

use super::truncate_chars;
use crate::db::models::{RecommendedProduct, StoreStats};
use crate::engine::EngineSnapshot;

/// Display a ranked recommendation list.
pub fn display_recommendations(title: &str, products: &[RecommendedProduct]) {
    println!("\n{}", format!("=== {title} ({} results) ===", products.len()).bold());

    if products.is_empty() {
        println!("  No eligible products.");
        return;
    }

    println!(
        "  {:>4}  {:<6} {:<30} {:<12} {:>9}  {:>6}",
        "Rank".dimmed(),
        "ID".dimmed(),
        "Name".dimmed(),
        "Category".dimmed(),
        "Price".dimmed(),
        "Score".dimmed(),
    );
    println!("  {}", "-".repeat(74).dimmed());

    for (i, product) in products.iter().enumerate() {
        println!(
            "  {:>4}. {:<6} {:<30} {:<12} {:>9.2}  {}",
            i + 1,
            product.id,
            truncate_chars(&product.name, 27),
            truncate_chars(&product.category, 9),
            product.price,
            colorize_score(product.score),
        );
    }
    println!();
}

/// Display a "no recommendations" outcome with its reason code.
pub fn display_no_recommendations(reason: &str, message: &str) {
    println!(
        "{} no recommendations available ({}): {}",
        "!".yellow().bold(),
        reason.yellow(),
        message
    );
}

/// Display store and snapshot statistics.
pub fn display_status(db_path: &str, stats: &StoreStats, snapshot: Option<&EngineSnapshot>) {
    println!("Database: {db_path}");
    println!(
        "Catalog: {} products, {} purchases by {} users",
        stats.products, stats.purchases, stats.users
    );
    match snapshot {
        Some(s) => println!(
            "Snapshot: v{} with {} products x {} features (built {})",
            s.version,
            s.catalog().len(),
            s.catalog().dimension(),
            s.built_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ),
        None => println!(
            "Snapshot: {}",
            "catalog cannot be indexed (see error above)".red()
        ),
    }
}

/// Scores are cosine similarities; color by how close they are to 1.
fn colorize_score(score: f64) -> String {
    let text = format!("{score:>6.4}");
    if score >= 0.95 {
        text.green().bold().to_string()
    } else if score >= 0.8 {
        text.green().to_string()
    } else if score >= 0.5 {
        text.yellow().to_string()
    } else {
        text.dimmed().to_string()
    }
}
