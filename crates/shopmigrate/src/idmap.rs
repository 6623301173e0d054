//! Run-scoped identifier remapping table.

use std::collections::HashMap;
use std::fmt;

/// The entity kinds handled by the migration, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Catalog products, migrated first.
    Product,
    /// Customer accounts, migrated second.
    User,
    /// Orders, migrated last because they reference the other two.
    Order,
}

impl EntityKind {
    /// Source collection holding records of this kind.
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::User => "users",
            Self::Order => "orders",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "Product"),
            Self::User => write!(f, "User"),
            Self::Order => write!(f, "Order"),
        }
    }
}

/// Maps `(kind, source id)` pairs to destination primary keys.
///
/// Built incrementally while the dependency kinds migrate and consulted by
/// the order phase. Holds one entry per migrated record for the run's
/// lifetime, so memory grows linearly with the dataset.
#[derive(Debug, Default)]
pub struct IdMap {
    entries: HashMap<EntityKind, HashMap<String, String>>,
}

impl IdMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mapping. The first write for a key wins; later writes for
    /// the same key are ignored.
    pub fn insert(&mut self, kind: EntityKind, source_id: &str, dest_id: String) {
        self.entries
            .entry(kind)
            .or_default()
            .entry(source_id.to_string())
            .or_insert(dest_id);
    }

    /// Looks up the destination id recorded for a source id.
    #[must_use]
    pub fn get(&self, kind: EntityKind, source_id: &str) -> Option<&str> {
        self.entries
            .get(&kind)
            .and_then(|m| m.get(source_id))
            .map(String::as_str)
    }

    /// Number of mappings recorded so far, across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// True when no mapping has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map = IdMap::new();
        map.insert(EntityKind::Product, "abc", "p-1".to_string());

        assert_eq!(map.get(EntityKind::Product, "abc"), Some("p-1"));
        assert_eq!(map.get(EntityKind::Product, "missing"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let mut map = IdMap::new();
        map.insert(EntityKind::User, "abc", "u-1".to_string());
        map.insert(EntityKind::User, "abc", "u-2".to_string());

        assert_eq!(map.get(EntityKind::User, "abc"), Some("u-1"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mut map = IdMap::new();
        map.insert(EntityKind::Product, "abc", "p-1".to_string());
        map.insert(EntityKind::User, "abc", "u-1".to_string());

        assert_eq!(map.get(EntityKind::Product, "abc"), Some("p-1"));
        assert_eq!(map.get(EntityKind::User, "abc"), Some("u-1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(EntityKind::Product.collection(), "products");
        assert_eq!(EntityKind::User.collection(), "users");
        assert_eq!(EntityKind::Order.collection(), "orders");
    }
}
