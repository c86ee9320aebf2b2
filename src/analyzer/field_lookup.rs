use crate::{
    analyzer::AnalyzerError,
    metadata::FieldMeta,
    parser::ast::{QueryFacts, ResolvedField, Resource},
};

/// A field reference matched against one resource in scope.
#[derive(Debug, Clone)]
pub struct FieldMatch<'a> {
    pub resource: &'a Resource,
    /// Written with an alias or table qualifier
    pub qualified: bool,
    /// Property path as declared on the resource (`address.city`)
    pub property: String,
    pub field: &'a FieldMeta,
}

impl FieldMatch<'_> {
    /// Physical reference: `[qualifier.]column`.
    pub fn rewritten(&self) -> String {
        if self.qualified {
            format!("{}.{}", self.resource.qualifier(), self.field.column)
        } else {
            self.field.column.clone()
        }
    }

    pub fn resolved(&self) -> ResolvedField {
        ResolvedField {
            ty: self.field.ty,
            nullable: self.field.nullable,
            entity: self.resource.entity.as_ref().map(|entity| entity.name.clone()),
            property: Some(self.property.clone()),
        }
    }
}

pub struct FieldLookup;

impl FieldLookup {
    /// Match `value` (`alias.property[.sub]` or `property[.sub]`) against the
    /// resources of `scopes`. Qualifiers bind to the innermost scope mapping
    /// them; unqualified properties must be unique across all scopes.
    ///
    /// Returns `Ok(None)` when the reference can only belong to a raw table,
    /// whose columns are unknown.
    pub fn find<'a, I>(value: &str, scopes: I) -> Result<Option<FieldMatch<'a>>, AnalyzerError>
    where
        I: IntoIterator<Item = &'a QueryFacts>,
    {
        let scopes: Vec<&QueryFacts> = scopes.into_iter().collect();
        let segments: Vec<&str> = value.split('.').collect();

        if segments.len() > 3 || segments.iter().any(|segment| segment.is_empty()) {
            return Err(AnalyzerError::UnknownField { name: value.to_string(), candidates: Vec::new() });
        }

        if let [qualifier, rest @ ..] = segments.as_slice() {
            if !rest.is_empty() {
                let resource = scopes.iter().copied().find_map(|facts| facts.resources.by_qualifier(qualifier));
                match resource {
                    Some(resource) => return Self::qualified(value, resource, rest),
                    None if rest.len() > 1 => return Err(AnalyzerError::UnknownAlias(qualifier.to_string())),
                    None => {},
                }
            }
        }

        Self::unqualified(value, &segments, &scopes)
    }

    fn qualified<'a>(value: &str, resource: &'a Resource, path: &[&str]) -> Result<Option<FieldMatch<'a>>, AnalyzerError> {
        if resource.is_raw() {
            return Ok(None);
        }

        let property = path[0];
        let field = resource.field(property).ok_or_else(|| AnalyzerError::UnknownField {
            name: value.to_string(),
            candidates: Self::candidates([resource]),
        })?;

        Self::matched(value, resource, true, property, field, path.get(1).copied()).map(Some)
    }

    fn unqualified<'a>(value: &str, segments: &[&str], scopes: &[&'a QueryFacts]) -> Result<Option<FieldMatch<'a>>, AnalyzerError> {
        let property = segments[0];
        let subproperty = segments.get(1).copied();

        // Every visible query counts; a property exposed twice is ambiguous
        // even when the two resources sit at different nesting levels.
        let matches: Vec<(&Resource, &FieldMeta)> = scopes.iter()
            .flat_map(|facts| facts.resources.iter())
            .filter_map(|resource| resource.field(property).map(|field| (resource, field)))
            .collect();

        match matches.as_slice() {
            [] => {},
            [(resource, field)] => {
                return Self::matched(value, *resource, false, property, *field, subproperty).map(Some);
            },
            _ => {
                return Err(AnalyzerError::AmbiguousIdentifier {
                    name: value.to_string(),
                    matches: matches.iter()
                        .map(|(resource, _)| format!("{}.{}", resource.qualifier(), property))
                        .collect(),
                });
            },
        }

        if scopes.iter().any(|facts| facts.resources.has_raw()) {
            return Ok(None);
        }

        if let Some(qualifier) = segments.first().filter(|_| segments.len() > 1) {
            return Err(AnalyzerError::UnknownAlias(qualifier.to_string()));
        }

        Err(AnalyzerError::UnknownField {
            name: value.to_string(),
            candidates: Self::candidates(scopes.iter().flat_map(|facts| facts.resources.iter())),
        })
    }

    fn matched<'a>(
        value: &str,
        resource: &'a Resource,
        qualified: bool,
        property: &str,
        field: &'a FieldMeta,
        subproperty: Option<&str>,
    ) -> Result<FieldMatch<'a>, AnalyzerError> {
        let Some(subproperty) = subproperty else {
            return Ok(FieldMatch { resource, qualified, property: property.to_string(), field });
        };

        if !field.has_subfields() {
            return Err(AnalyzerError::NoSubfields(format!("{}.{}", resource.qualifier(), property)));
        }

        let subfield = field.subfields.get(subproperty).ok_or_else(|| AnalyzerError::UnknownField {
            name: value.to_string(),
            candidates: field.subfields.keys().map(|sub| format!("{}.{}", property, sub)).collect(),
        })?;

        Ok(FieldMatch { resource, qualified, property: format!("{}.{}", property, subproperty), field: subfield })
    }

    fn candidates<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> Vec<String> {
        resources.into_iter()
            .filter_map(|resource| resource.fields.as_ref())
            .flat_map(|fields| fields.keys().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        analyzer::{AnalyzerError, FieldLookup},
        fixtures,
        metadata::FieldType,
        parser::ast::{QueryFacts, Resource},
    };

    fn facts(resources: Vec<Resource>) -> QueryFacts {
        let mut facts = QueryFacts::default();
        for resource in resources {
            facts.resources.register(resource).unwrap();
        }
        facts
    }

    #[test]
    pub fn test_qualified_rewrite_to_column() {
        let scope = facts(vec![Resource::mapped(Some("u"), Arc::new(fixtures::user()))]);

        let found = FieldLookup::find("u.email", [&scope]).unwrap().unwrap();
        assert_eq!(found.rewritten(), "u.email_address");
        assert_eq!(found.property, "email");
        assert!(found.resolved().nullable);
    }

    #[test]
    pub fn test_unqualified_and_ambiguous() {
        let scope = facts(vec![
            Resource::mapped(Some("u"), Arc::new(fixtures::user())),
            Resource::mapped(Some("c"), Arc::new(fixtures::customer())),
        ]);

        let found = FieldLookup::find("email", [&scope]).unwrap().unwrap();
        assert_eq!(found.rewritten(), "email_address");

        match FieldLookup::find("name", [&scope]) {
            Err(AnalyzerError::AmbiguousIdentifier { matches, .. }) => assert_eq!(matches, vec!["u.name", "c.name"]),
            other => panic!("Expected ambiguity, got {:?}", other),
        }
        assert!(FieldLookup::find("c.name", [&scope]).unwrap().is_some());
    }

    #[test]
    pub fn test_embedded_subproperty() {
        let scope = facts(vec![Resource::mapped(Some("c"), Arc::new(fixtures::customer()))]);

        let found = FieldLookup::find("c.address.city", [&scope]).unwrap().unwrap();
        assert_eq!(found.rewritten(), "c.address_city");
        assert_eq!(found.resolved().ty, FieldType::String);

        let found = FieldLookup::find("address.zip", [&scope]).unwrap().unwrap();
        assert_eq!(found.rewritten(), "address_zip");

        assert_eq!(FieldLookup::find("c.name.first", [&scope]).unwrap_err(), AnalyzerError::NoSubfields("c.name".into()));
    }

    #[test]
    pub fn test_unqualified_is_ambiguous_across_scopes() {
        let outer = facts(vec![Resource::mapped(Some("u"), Arc::new(fixtures::user()))]);
        let inner = facts(vec![Resource::mapped(Some("c"), Arc::new(fixtures::customer()))]);

        match FieldLookup::find("name", [&inner, &outer]) {
            Err(AnalyzerError::AmbiguousIdentifier { name, matches }) => {
                assert_eq!(name, "name");
                assert_eq!(matches, vec!["c.name", "u.name"]);
            },
            other => panic!("Expected ambiguous identifier, got {:?}", other),
        }

        let found = FieldLookup::find("c.name", [&inner, &outer]).unwrap().unwrap();
        assert_eq!(found.resource.qualifier(), "c");
        let found = FieldLookup::find("u.email", [&inner, &outer]).unwrap().unwrap();
        assert_eq!(found.resource.qualifier(), "u");

        // Unique to the outer query: a correlated reference
        let found = FieldLookup::find("email", [&inner, &outer]).unwrap().unwrap();
        assert_eq!(found.resource.qualifier(), "u");
        assert_eq!(found.rewritten(), "email_address");
    }

    #[test]
    pub fn test_unknown_and_raw() {
        let scope = facts(vec![Resource::mapped(None, Arc::new(fixtures::user()))]);
        match FieldLookup::find("nickname", [&scope]) {
            Err(AnalyzerError::UnknownField { name, candidates }) => {
                assert_eq!(name, "nickname");
                assert_eq!(candidates, vec!["id", "name", "email"]);
            },
            other => panic!("Expected unknown field, got {:?}", other),
        }
        assert_eq!(FieldLookup::find("x.y.z", [&scope]).unwrap_err(), AnalyzerError::UnknownAlias("x".into()));

        let scope = facts(vec![Resource::raw(Some("l"), "audit_log")]);
        assert!(FieldLookup::find("anything", [&scope]).unwrap().is_none());
        assert!(FieldLookup::find("l.anything", [&scope]).unwrap().is_none());
    }
}
