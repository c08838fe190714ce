// Read-only interfaces onto the external stores.
//
// The engine never talks to the database directly. Anything that can hand
// back entities by identifier, or a user's interaction set, can feed it.

use std::collections::BTreeSet;

use super::snapshot::Entity;

/// Read access to a catalog of entities.
pub trait CatalogLookup {
    /// Look up one entity by identifier.
    fn get(&self, id: &str) -> Option<&Entity>;

    /// Every entity, in canonical index order.
    fn all(&self) -> &[Entity];
}

/// Maps a user to the entities they have interacted with (purchased).
pub trait InteractionHistory {
    /// The user's interaction set. Unknown users yield an empty set.
    fn interacted_entities(&self, user_id: &str) -> BTreeSet<String>;
}
