use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use recommender::config::Config;
use recommender::db::{self, models::Product, models::RecommendedProduct, Database};
use recommender::engine::{Recommendation, RecommendationEngine};
use recommender::error::RecommendError;
use recommender::output::terminal;

/// Recommender: content-based product recommendations.
///
/// Ranks catalog products by cosine similarity of their feature vectors,
/// either against one product or against a user's purchase profile.
#[derive(Parser)]
#[command(name = "recommender", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init {
        /// Load the sample catalog and purchases if the catalog is empty
        #[arg(long)]
        seed: bool,
    },

    /// Import products from a JSON file (an array of products)
    Import {
        /// Path to the JSON file
        path: String,
    },

    /// Record that a user purchased a product
    Record {
        user_id: String,
        product_id: String,
    },

    /// Products similar to a given product
    Similar {
        product_id: String,

        /// How many results to return (clamped to the configured maximum)
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Products for a user, from their purchase history
    ForUser {
        user_id: String,

        /// How many results to return (clamped to the configured maximum)
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Ask a running server for recommendations
    Query {
        #[command(subcommand)]
        target: QueryTarget,

        /// Server base URL (defaults to RECOMMENDER_URL)
        #[arg(long, global = true)]
        url: Option<String>,

        /// How many results to request
        #[arg(long, global = true)]
        max_results: Option<usize>,
    },

    /// Show database and catalog status
    Status,

    /// Run the recommendation HTTP service
    Serve {
        /// Port to listen on (defaults to SERVICE_PORT, then 5001)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind to (defaults to SERVICE_BIND, then 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum QueryTarget {
    /// Item-based recommendations for a product
    Product { id: String },
    /// User-based recommendations for a user
    User { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("recommender=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init { seed } => {
            info!("Initializing recommender database...");
            let db = db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");

            if seed {
                if db.seed_sample_data().await? {
                    println!("{}", "Sample catalog and purchases loaded.".green());
                } else {
                    println!("Catalog already has products; sample data not loaded.");
                }
            }
        }

        Commands::Import { path } => {
            let db = db::open_sqlite(&config.db_path)?;
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {path}"))?;
            let products: Vec<Product> = serde_json::from_str(&raw)
                .with_context(|| format!("{path} is not a JSON array of products"))?;

            for product in &products {
                db.upsert_product(product).await?;
            }
            println!("Imported {} products from {path}", products.len());

            // Catch a bad import now instead of at the next server start.
            if let Err(e) = db::load_catalog(db.as_ref()).await {
                println!("{} {e:#}", "Warning:".yellow().bold());
            }
        }

        Commands::Record {
            user_id,
            product_id,
        } => {
            let db = db::open_sqlite(&config.db_path)?;
            if db.record_purchase(&user_id, &product_id).await? {
                println!("Recorded purchase of {product_id} by {user_id}");
            } else {
                println!("{user_id} already purchased {product_id}");
            }
        }

        Commands::Similar {
            product_id,
            max_results,
        } => {
            let db = db::open_sqlite(&config.db_path)?;
            let engine = build_engine(db.as_ref(), &config).await?;
            let result = engine.similar_to(&product_id, max_results, &[]);
            show_result(db.as_ref(), &format!("Similar to {product_id}"), result).await?;
        }

        Commands::ForUser {
            user_id,
            max_results,
        } => {
            let db = db::open_sqlite(&config.db_path)?;
            let engine = build_engine(db.as_ref(), &config).await?;
            let history = db.get_purchase_history(&user_id).await?;
            let result = engine.recommend_for_user(&history, &user_id, max_results);
            show_result(db.as_ref(), &format!("Recommended for {user_id}"), result).await?;
        }

        Commands::Query {
            target,
            url,
            max_results,
        } => {
            let base_url = url.unwrap_or_else(|| config.server_url.clone());
            let client = recommender::client::RecommendationClient::new(&base_url)?;
            let (title, products) = match target {
                QueryTarget::Product { id } => (
                    format!("Similar to {id} (via {base_url})"),
                    client.product_recommendations(&id, max_results).await?,
                ),
                QueryTarget::User { id } => (
                    format!("Recommended for {id} (via {base_url})"),
                    client.user_recommendations(&id, max_results).await?,
                ),
            };
            terminal::display_recommendations(&title, &products);
        }

        Commands::Status => {
            if !recommender::status::database_exists(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `recommender init --seed` to set up the database.");
                return Ok(());
            }
            let db = db::open_sqlite(&config.db_path)?;
            recommender::status::show(&db, &config.db_path).await?;
        }

        Commands::Serve { port, bind } => {
            let mut config = config;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(config).await?;
        }
    }

    Ok(())
}

/// Load the stored catalog and build the similarity matrix.
async fn build_engine(db: &dyn Database, config: &Config) -> Result<RecommendationEngine> {
    let catalog = db::load_catalog(db).await?;
    let engine = RecommendationEngine::new(catalog, config.limits)?;
    Ok(engine)
}

/// Print a local ranking result, joined with the stored product details.
async fn show_result(
    db: &dyn Database,
    title: &str,
    result: std::result::Result<Vec<Recommendation>, RecommendError>,
) -> Result<()> {
    match result {
        Ok(recommendations) => {
            let ids: Vec<String> = recommendations.iter().map(|r| r.id.clone()).collect();
            let products = db.get_products_by_ids(&ids).await?;
            let joined = RecommendedProduct::join(&recommendations, &products);
            terminal::display_recommendations(title, &joined);
        }
        Err(e) => terminal::display_no_recommendations(e.reason_code(), &e.to_string()),
    }
    Ok(())
}

#[cfg(feature = "web")]
async fn serve(config: Config) -> Result<()> {
    let db = db::connect_with_retry(
        &config.db_path,
        config.db_connect_retries,
        std::time::Duration::from_secs(5),
    )
    .await?;

    // A catalog that can't be indexed is a startup failure, not a per-request one.
    let engine = std::sync::Arc::new(build_engine(db.as_ref(), &config).await?);
    recommender::web::run_server(&config, db, engine).await
}

#[cfg(not(feature = "web"))]
async fn serve(_config: Config) -> Result<()> {
    anyhow::bail!("This build has no HTTP server. Rebuild with `--features web`.")
}
