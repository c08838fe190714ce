// Catalog snapshots and the lookup interfaces the engine reads through.

pub mod history;
pub mod snapshot;
pub mod traits;

pub use history::PurchaseHistory;
pub use snapshot::{CatalogSnapshot, Entity};
pub use traits::{CatalogLookup, InteractionHistory};
