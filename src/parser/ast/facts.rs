use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{analyzer::AnalyzerError, metadata::{EntityMeta, FieldMeta, FieldType}};

/// A table source visible to a query: a mapped entity, a derived table or a
/// raw table the compiler knows nothing about.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub alias: Option<String>,
    /// Entity name, or the table name for raw and derived resources
    pub name: String,
    pub table: String,
    pub entity: Option<Arc<EntityMeta>>,
    /// Property map; `None` for raw tables, whose columns are unknown
    pub fields: Option<IndexMap<String, FieldMeta>>,
}

impl Resource {
    pub fn mapped(alias: Option<&str>, entity: Arc<EntityMeta>) -> Self {
        Self {
            alias: alias.map(str::to_string),
            name: entity.name.clone(),
            table: entity.table.clone(),
            fields: Some(entity.fields.clone()),
            entity: Some(entity),
        }
    }

    pub fn raw(alias: Option<&str>, table: &str) -> Self {
        Self {
            alias: alias.map(str::to_string),
            name: table.to_string(),
            table: table.to_string(),
            entity: None,
            fields: None,
        }
    }

    pub fn derived(alias: &str, fields: IndexMap<String, FieldMeta>) -> Self {
        Self {
            alias: Some(alias.to_string()),
            name: alias.to_string(),
            table: alias.to_string(),
            entity: None,
            fields: Some(fields),
        }
    }

    /// Name used to qualify columns of this resource in rendered SQL.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table)
    }

    pub fn is_raw(&self) -> bool {
        self.fields.is_none()
    }

    pub fn matches_qualifier(&self, qualifier: &str) -> bool {
        match &self.alias {
            Some(alias) => alias == qualifier,
            None => self.table == qualifier || self.name == qualifier,
        }
    }

    pub fn field(&self, property: &str) -> Option<&FieldMeta> {
        self.fields.as_ref().and_then(|fields| fields.get(property))
    }
}

/// Resources of one query keyed by alias. The first unaliased resource takes
/// the empty key; further unaliased ones are keyed by their table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceMap(IndexMap<Option<String>, Resource>);

impl ResourceMap {
    pub fn register(&mut self, resource: Resource) -> Result<(), AnalyzerError> {
        let key = match &resource.alias {
            Some(alias) => Some(alias.clone()),
            None if self.0.contains_key(&None) => Some(resource.table.clone()),
            None => None,
        };

        if self.0.contains_key(&key) {
            return Err(AnalyzerError::DuplicateAlias { alias: resource.qualifier().to_string() });
        }

        self.0.insert(key, resource);
        Ok(())
    }

    pub fn by_qualifier(&self, qualifier: &str) -> Option<&Resource> {
        self.0.values().find(|resource| resource.matches_qualifier(qualifier))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_raw(&self) -> bool {
        self.0.values().any(Resource::is_raw)
    }
}

/// One output column of a compiled query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Column label the database returns
    pub column: String,
    pub ty: Option<FieldType>,
    pub nullable: bool,
    /// `Entity.property` the column was read from, when known
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKey {
    Name(String),
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterSlot {
    /// Caller supplies the value at bind time
    Required { key: ParameterKey, ty: Option<FieldType> },
    /// Value embedded at compile time
    Fixed { value: Value, ty: Option<FieldType> },
}

impl ParameterSlot {
    pub fn ty(&self) -> Option<FieldType> {
        match self {
            ParameterSlot::Required { ty, .. } | ParameterSlot::Fixed { ty, .. } => *ty,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ParameterSlot::Required { .. })
    }
}

/// Values supplied by position and by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    pub positional: Vec<Value>,
    pub named: IndexMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: Vec<Value>) -> Self {
        Self { positional: values, named: IndexMap::new() }
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.named.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, key: &ParameterKey) -> Option<&Value> {
        match key {
            ParameterKey::Name(name) => self.named.get(name),
            ParameterKey::Position(position) => self.positional.get(*position),
        }
    }
}

/// Compile-time facts accumulated on a query by the resolution passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFacts {
    pub resources: ResourceMap,
    /// Output name -> column, in select order
    pub result_fields: IndexMap<String, ResultColumn>,
    /// Parameter slots in native placeholder order; only filled on the root query
    pub parameters: Vec<ParameterSlot>,
    /// Values parameter references of this query may take at compile time
    pub literals: Option<Bindings>,
    /// Explicit result aliases, referable from ORDER BY, GROUP BY and HAVING
    pub labels: Vec<String>,
}

impl QueryFacts {
    pub fn register_result(&mut self, name: &str, column: ResultColumn) -> Result<(), AnalyzerError> {
        if self.result_fields.contains_key(name) {
            return Err(AnalyzerError::DuplicateResultAlias { alias: name.to_string() });
        }
        self.result_fields.insert(name.to_string(), column);
        Ok(())
    }

    /// Append a slot and return its ordinal.
    pub fn register_parameter(&mut self, slot: ParameterSlot) -> usize {
        self.parameters.push(slot);
        self.parameters.len() - 1
    }

    pub fn is_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::{
        analyzer::AnalyzerError,
        metadata::{EntityMeta, FieldMeta, FieldType},
        parser::ast::{Bindings, ParameterKey, QueryFacts, Resource, ResourceMap, ResultColumn},
    };

    #[test]
    pub fn test_duplicate_alias_is_rejected() {
        let user = Arc::new(EntityMeta::new("User", "users").with_field("id", FieldMeta::new("id", FieldType::Int)));
        let mut resources = ResourceMap::default();

        resources.register(Resource::mapped(Some("u"), user.clone())).unwrap();
        let err = resources.register(Resource::raw(Some("u"), "logs")).unwrap_err();
        assert!(matches!(err, AnalyzerError::DuplicateAlias { alias } if alias == "u"));
    }

    #[test]
    pub fn test_unaliased_resources() {
        let mut resources = ResourceMap::default();
        resources.register(Resource::raw(None, "users")).unwrap();
        resources.register(Resource::raw(None, "orders")).unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(resources.by_qualifier("orders").unwrap().table, "orders");
        assert!(resources.register(Resource::raw(None, "orders")).is_err());
    }

    #[test]
    pub fn test_mapped_resource_matches_entity_name() {
        let user = Arc::new(EntityMeta::new("User", "users"));
        let resource = Resource::mapped(None, user);

        assert!(resource.matches_qualifier("User"));
        assert!(resource.matches_qualifier("users"));
        assert_eq!(resource.qualifier(), "users");
    }

    #[test]
    pub fn test_duplicate_result_alias() {
        let mut facts = QueryFacts::default();
        let column = ResultColumn { column: "id".into(), ty: None, nullable: false, source: None };

        facts.register_result("id", column.clone()).unwrap();
        assert!(matches!(facts.register_result("id", column), Err(AnalyzerError::DuplicateResultAlias { .. })));
    }

    #[test]
    pub fn test_bindings_lookup() {
        let bindings = Bindings::positional(vec![json!(1)]).with("name", json!("x"));

        assert_eq!(bindings.get(&ParameterKey::Position(0)), Some(&json!(1)));
        assert_eq!(bindings.get(&ParameterKey::Name("name".into())), Some(&json!("x")));
        assert_eq!(bindings.get(&ParameterKey::Position(1)), None);
    }
}
