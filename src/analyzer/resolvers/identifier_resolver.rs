use crate::{
    analyzer::{AnalyzerError, FieldLookup},
    compile_error::CompileError,
    parser::ast::{Expression, Identifier},
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Clauses that may name a result alias instead of a field.
const LABEL_SLOTS: [&str; 3] = ["order_by", "group_by", "having"];

/// Tags identifiers with their field type and rewrites them to physical
/// columns.
pub struct IdentifierResolver;

impl IdentifierResolver {
    fn is_label(identifier: &Identifier, ctx: &WalkContext) -> bool {
        identifier.qualifier().is_none()
            && ctx.query_slot().is_some_and(|slot| LABEL_SLOTS.contains(&slot))
            && ctx.scope().is_some_and(|facts| facts.is_label(&identifier.value))
    }

    /// Resolving twice is a no-op: the first resolution keeps its facts.
    pub fn resolve(identifier: &mut Identifier, ctx: &WalkContext) -> Result<(), AnalyzerError> {
        if identifier.is_resolved() || identifier.is_wildcard() || Self::is_label(identifier, ctx) {
            return Ok(());
        }

        let Some(found) = FieldLookup::find(&identifier.value, ctx.visible_scopes())? else {
            return Ok(());
        };

        let rewritten = found.rewritten();
        identifier.resolve(found.resolved());
        if rewritten != identifier.value {
            identifier.value = rewritten;
        }
        Ok(())
    }
}

impl Visitor for IdentifierResolver {
    fn name(&self) -> &'static str {
        "identifier"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select, NodeKind::Identifier]
    }

    fn enter(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        match node {
            NodeMut::Select(select) => {
                select.facts.labels = select.fields.iter().filter_map(|field| field.alias.clone()).collect();
            },
            NodeMut::Expression(Expression::Identifier(identifier)) => Self::resolve(identifier, ctx)?,
            _ => {},
        }
        Ok(VisitAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analyzer::{AnalyzerError, EntityResolver, IdentifierResolver, JoinResolver, SubqueryMapping},
        compile_error::CompileError,
        fixtures,
        metadata::FieldType,
        parser::ast::{Expression, Query},
        walker::Walker,
    };

    fn resolve(text: &str) -> Result<Query, CompileError> {
        let provider = fixtures::provider();
        let mut query = Query::try_from(text)?;
        Walker::new(vec![Box::new(EntityResolver::new(provider.clone(), false))]).walk(&mut query)?;
        Walker::new(vec![Box::new(SubqueryMapping)]).walk(&mut query)?;
        Walker::new(vec![Box::new(JoinResolver::new(provider))]).walk(&mut query)?;
        Walker::new(vec![Box::new(IdentifierResolver)]).walk(&mut query)?;
        Ok(query)
    }

    #[test]
    pub fn test_rewrite_to_columns() {
        let query = resolve("SELECT u.email, name FROM User u WHERE email = 'a@b.c' ORDER BY u.name").unwrap();
        assert_eq!(query.to_string(), "SELECT u.email_address, name FROM users u WHERE email_address = 'a@b.c' ORDER BY u.name ASC");
    }

    #[test]
    pub fn test_resolution_is_idempotent() {
        let mut query = resolve("SELECT u.email FROM User u").unwrap();
        let before = query.clone();

        Walker::new(vec![Box::new(IdentifierResolver)]).walk(&mut query).unwrap();
        assert_eq!(query, before);

        let Query::Select(select) = &query else { panic!("Expected select") };
        let Expression::Identifier(identifier) = &select.fields[0].expression else { panic!("Expected identifier") };
        let resolved = identifier.resolved().unwrap();
        assert_eq!(resolved.ty, FieldType::String);
        assert!(resolved.nullable);
        assert_eq!(resolved.property.as_deref(), Some("email"));
    }

    #[test]
    pub fn test_ambiguous_unless_qualified() {
        let err = resolve("SELECT u.id FROM User u JOIN Customer c ON c.id = u.id WHERE name = 'x'").unwrap_err();
        assert!(matches!(err, CompileError::Query(AnalyzerError::AmbiguousIdentifier { ref name, .. }) if name == "name"));

        assert!(resolve("SELECT u.id FROM User u JOIN Customer c ON c.id = u.id WHERE u.name = 'x'").is_ok());
        assert!(resolve("SELECT u.id FROM User u JOIN Customer c ON c.id = u.id WHERE c.name = 'x'").is_ok());
    }

    #[test]
    pub fn test_unknown_field() {
        let err = resolve("SELECT nickname FROM User").unwrap_err();
        assert!(matches!(err, CompileError::Query(AnalyzerError::UnknownField { ref name, .. }) if name == "nickname"));
    }

    #[test]
    pub fn test_correlated_subquery_sees_outer_alias() {
        let query = resolve(
            "SELECT c.name FROM Customer c WHERE c.id IN (SELECT o.customerId FROM orders o WHERE o.total > c.id)"
        ).unwrap();
        assert!(query.to_string().contains("o.total > c.id"));
    }

    #[test]
    pub fn test_subquery_property_clashing_with_outer_is_ambiguous() {
        let err = resolve("SELECT c.id FROM Customer c WHERE c.id IN (SELECT u.id FROM User u WHERE name = 'x')").unwrap_err();
        assert!(matches!(err, CompileError::Query(AnalyzerError::AmbiguousIdentifier { ref name, .. }) if name == "name"));

        assert!(resolve("SELECT c.id FROM Customer c WHERE c.id IN (SELECT u.id FROM User u WHERE u.name = 'x')").is_ok());
        let query = resolve("SELECT c.id FROM Customer c WHERE c.id IN (SELECT u.id FROM User u WHERE email = 'x')").unwrap();
        assert!(query.to_string().contains("WHERE email_address = 'x'"));
    }

    #[test]
    pub fn test_derived_table_columns() {
        let query = resolve("SELECT d.email FROM (SELECT email FROM User) d").unwrap();
        assert_eq!(query.to_string(), "SELECT d.email_address FROM (SELECT email_address FROM users) d");
    }

    #[test]
    pub fn test_result_alias_in_order_by() {
        let query = resolve("SELECT u.name AS label FROM User u ORDER BY label DESC").unwrap();
        assert!(query.to_string().ends_with("ORDER BY label DESC"));

        let err = resolve("SELECT u.name AS label FROM User u WHERE label = 'x'").unwrap_err();
        assert!(matches!(err, CompileError::Query(AnalyzerError::UnknownField { .. })));
    }

    #[test]
    pub fn test_embedded_field() {
        let query = resolve("SELECT c.address.city FROM Customer c").unwrap();
        assert_eq!(query.to_string(), "SELECT c.address_city FROM customers c");

        let err = resolve("SELECT c.name.first FROM Customer c").unwrap_err();
        assert_eq!(err, CompileError::Query(AnalyzerError::NoSubfields("c.name".into())));
    }

    #[test]
    pub fn test_raw_tables_are_left_alone() {
        let query = resolve("SELECT l.whatever FROM audit_log l WHERE l.level = 'x'").unwrap();
        assert_eq!(query.to_string(), "SELECT l.whatever FROM audit_log l WHERE l.level = 'x'");
    }
}
