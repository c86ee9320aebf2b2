use std::sync::Arc;

use crate::metadata::{EntityMeta, EntityRegistry, FieldMeta, FieldType, MetadataProvider, RelationMeta};

pub fn user() -> EntityMeta {
    EntityMeta::new("User", "users")
        .with_field("id", FieldMeta::new("id", FieldType::Int))
        .with_field("name", FieldMeta::new("name", FieldType::String))
        .with_field("email", FieldMeta::new("email_address", FieldType::String).nullable())
        .with_relation("profile", RelationMeta::forward("Profile", "id"))
        .with_identifier(&["id"])
}

pub fn customer() -> EntityMeta {
    let address = FieldMeta::new("address", FieldType::Json)
        .with_subfield("city", FieldMeta::new("address_city", FieldType::String).nullable())
        .with_subfield("zip", FieldMeta::new("address_zip", FieldType::String).nullable());

    EntityMeta::new("Customer", "customers")
        .with_field("id", FieldMeta::new("id", FieldType::Int))
        .with_field("name", FieldMeta::new("name", FieldType::String))
        .with_field("address", address)
        .with_relation("orders", RelationMeta::inverse("Order", "customerId"))
        .with_relation("openOrders", RelationMeta::inverse("Order", "customerId").with_filter("status = 'open'"))
        .with_relation("tags", RelationMeta::junction("Tag", "customer_tags", "customer_id", "tag_id"))
        .with_identifier(&["id"])
}

pub fn order() -> EntityMeta {
    EntityMeta::new("Order", "orders")
        .with_field("id", FieldMeta::new("id", FieldType::Int))
        .with_field("customerId", FieldMeta::new("customerId", FieldType::Int))
        .with_field("total", FieldMeta::new("total", FieldType::Float))
        .with_field("status", FieldMeta::new("status", FieldType::String))
        .with_field("createdAt", FieldMeta::new("created_at", FieldType::DateTime))
        .with_relation("customer", RelationMeta::forward("Customer", "customerId"))
        .with_identifier(&["id"])
}

pub fn tag() -> EntityMeta {
    EntityMeta::new("Tag", "tags")
        .with_field("id", FieldMeta::new("id", FieldType::Int))
        .with_field("label", FieldMeta::new("label", FieldType::String))
        .with_identifier(&["id"])
}

pub fn member() -> EntityMeta {
    EntityMeta::new("Member", "members")
        .with_field("id", FieldMeta::new("id", FieldType::Int))
        .with_field("status", FieldMeta::new("status", FieldType::String))
        .with_field("age", FieldMeta::new("age", FieldType::Int).nullable())
        .with_field("active", FieldMeta::new("active", FieldType::Bool))
        .with_field("joinedOn", FieldMeta::new("joined_on", FieldType::Date).nullable())
        .with_identifier(&["id"])
}

/// Composite identifier: relations pointing at it cannot be joined.
pub fn profile() -> EntityMeta {
    EntityMeta::new("Profile", "profiles")
        .with_field("userId", FieldMeta::new("user_id", FieldType::Int))
        .with_field("kind", FieldMeta::new("kind", FieldType::String))
        .with_identifier(&["userId", "kind"])
}

pub fn registry() -> EntityRegistry {
    EntityRegistry::new()
        .with(user())
        .with(customer())
        .with(order())
        .with(tag())
        .with(member())
        .with(profile())
}

pub fn provider() -> Arc<dyn MetadataProvider> {
    Arc::new(registry())
}
