use indexmap::IndexMap;

use crate::metadata::FieldType;

/// Mapping of one entity property to its physical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    pub column: String,
    pub ty: FieldType,
    pub nullable: bool,
    /// Embedded sub-properties (`address.city`), keyed by sub-property name.
    pub subfields: IndexMap<String, FieldMeta>,
}

impl FieldMeta {
    pub fn new(column: &str, ty: FieldType) -> Self {
        Self { column: column.to_string(), ty, nullable: false, subfields: IndexMap::new() }
    }

    pub fn nullable(mut self) -> Self { self.nullable = true; self }

    pub fn with_subfield(mut self, name: &str, field: FieldMeta) -> Self {
        self.subfields.insert(name.to_string(), field);
        self
    }

    pub fn has_subfields(&self) -> bool {
        !self.subfields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_field() {
        let address = FieldMeta::new("address", FieldType::Json)
            .with_subfield("city", FieldMeta::new("address_city", FieldType::String).nullable());

        assert!(address.has_subfields());
        let city = address.subfields.get("city").unwrap();
        assert_eq!(city.column, "address_city");
        assert!(city.nullable);
    }
}
