use indexmap::IndexMap;

use crate::{analyzer::AnalyzerError, metadata::{FieldMeta, RelationMeta}};

/// Compile-time description of a mapped entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMeta {
    pub name: String,
    pub table: String,
    /// Property name -> column mapping, in declaration order
    pub fields: IndexMap<String, FieldMeta>,
    pub relations: IndexMap<String, RelationMeta>,
    /// Identifier property names; anything but exactly one is unusable for joins.
    pub identifier: Vec<String>,
}

impl EntityMeta {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            ..Default::default()
        }
    }

    pub fn with_field(mut self, property: &str, field: FieldMeta) -> Self {
        self.fields.insert(property.to_string(), field);
        self
    }

    pub fn with_relation(mut self, name: &str, relation: RelationMeta) -> Self {
        self.relations.insert(name.to_string(), relation);
        self
    }

    pub fn with_identifier(mut self, properties: &[&str]) -> Self {
        self.identifier = properties.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn field(&self, property: &str) -> Option<&FieldMeta> {
        self.fields.get(property)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationMeta> {
        self.relations.get(name)
    }

    /// The single identifier property and its mapping.
    pub fn identifier(&self) -> Result<(&str, &FieldMeta), AnalyzerError> {
        match self.identifier.as_slice() {
            [single] => self.fields.get(single)
                .map(|field| (single.as_str(), field))
                .ok_or_else(|| AnalyzerError::UnknownField {
                    name: format!("{}.{}", self.name, single),
                    candidates: self.fields.keys().cloned().collect(),
                }),
            other => Err(AnalyzerError::NoSingleIdentifier {
                entity: self.name.clone(),
                properties: other.to_vec(),
            }),
        }
    }
}
