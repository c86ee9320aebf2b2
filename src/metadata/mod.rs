use std::sync::Arc;

pub mod field_type;
pub use field_type::*;

pub mod field_meta;
pub use field_meta::*;

pub mod relation_meta;
pub use relation_meta::*;

pub mod entity_meta;
pub use entity_meta::*;

pub mod entity_registry;
pub use entity_registry::*;

pub trait MetadataProvider: Send + Sync {
    /// Given an entity name as written in a query, return its metadata if the
    /// name denotes a mapped entity.
    fn entity(&self, name: &str) -> Option<Arc<EntityMeta>>;
}
