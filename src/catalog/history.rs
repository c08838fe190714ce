// In-memory purchase history.
//
// The database loads one user's rows into this per request; tests build it
// directly. BTreeSet keeps iteration order stable for logging and output.

use std::collections::{BTreeSet, HashMap};

use super::traits::InteractionHistory;

#[derive(Debug, Clone, Default)]
pub struct PurchaseHistory {
    purchases: HashMap<String, BTreeSet<String>>,
}

impl PurchaseHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `user_id` purchased `product_id`. Repeats are no-ops.
    pub fn record(&mut self, user_id: impl Into<String>, product_id: impl Into<String>) {
        self.purchases
            .entry(user_id.into())
            .or_default()
            .insert(product_id.into());
    }

    /// Number of users with at least one purchase.
    pub fn user_count(&self) -> usize {
        self.purchases.len()
    }
}

impl<U, P> FromIterator<(U, P)> for PurchaseHistory
where
    U: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (U, P)>>(iter: I) -> Self {
        let mut history = PurchaseHistory::new();
        for (user, product) in iter {
            history.record(user, product);
        }
        history
    }
}

impl InteractionHistory for PurchaseHistory {
    fn interacted_entities(&self, user_id: &str) -> BTreeSet<String> {
        self.purchases.get(user_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_is_empty() {
        let history = PurchaseHistory::new();
        assert!(history.interacted_entities("nobody").is_empty());
    }

    #[test]
    fn test_repeat_purchases_collapse() {
        let history: PurchaseHistory =
            [("user1", "1"), ("user1", "3"), ("user1", "1"), ("user2", "2")]
                .into_iter()
                .collect();
        let user1 = history.interacted_entities("user1");
        assert_eq!(user1.into_iter().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(history.user_count(), 2);
    }
}
