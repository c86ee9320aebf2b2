use std::{collections::HashMap, sync::Arc};

use crate::metadata::{EntityMeta, MetadataProvider};

/// In-memory metadata provider.
///
/// Entities are looked up by entity name first and by table name second, so
/// `FROM User` and `FROM users` both map the same entity.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    by_name: HashMap<String, Arc<EntityMeta>>,
    by_table: HashMap<String, String>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, meta: EntityMeta) {
        self.by_table.insert(meta.table.clone(), meta.name.clone());
        self.by_name.insert(meta.name.clone(), Arc::new(meta));
    }

    pub fn with(mut self, meta: EntityMeta) -> Self {
        self.register(meta);
        self
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}

impl MetadataProvider for EntityRegistry {
    fn entity(&self, name: &str) -> Option<Arc<EntityMeta>> {
        if let Some(meta) = self.by_name.get(name) {
            return Some(Arc::clone(meta));
        }

        self.by_table.get(name)
            .and_then(|entity| self.by_name.get(entity))
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_table() {
        let registry = EntityRegistry::new()
            .with(EntityMeta::new("User", "users"))
            .with(EntityMeta::new("Order", "orders"));

        assert_eq!(registry.entity("User").unwrap().table, "users");
        assert_eq!(registry.entity("orders").unwrap().name, "Order");
        assert!(registry.entity("user").is_none());
        assert_eq!(registry.list(), vec!["Order", "User"]);
    }
}
