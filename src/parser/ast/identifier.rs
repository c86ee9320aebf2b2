use std::fmt;

use crate::{metadata::FieldType, parser::{ParseError, QueryParser, TokenKind}};

/// Type facts attached to an identifier once it has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub ty: FieldType,
    pub nullable: bool,
    /// Owning entity, when the identifier maps an entity property
    pub entity: Option<String>,
    /// Property name before column rewriting (`email` for `email_address`)
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub value: String,
    resolved: Option<ResolvedField>,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), resolved: None }
    }

    /// Parse a bare, dotted or quoted name. Quoted segments may be joined
    /// with `.` (`"Order".id`).
    pub fn parse(parser: &mut QueryParser) -> Result<Identifier, ParseError> {
        let mut value = parser.expect_identifier("Expected identifier")?;

        while parser.is_symbol(".") {
            let segment = match parser.peek(1) {
                Some(token) if token.kind == TokenKind::Identifier || token.is_symbol("*") => token.text.clone(),
                _ => break,
            };
            parser.jump(2);
            value.push('.');
            value.push_str(&segment);
        }

        Ok(Identifier::new(value))
    }

    pub fn resolved(&self) -> Option<&ResolvedField> {
        self.resolved.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Attach type facts. The first resolution wins; later attempts are
    /// ignored and return `false`.
    pub fn resolve(&mut self, field: ResolvedField) -> bool {
        if self.resolved.is_some() {
            return false;
        }
        self.resolved = Some(field);
        true
    }

    pub fn is_wildcard(&self) -> bool {
        self.value == "*" || self.value.ends_with(".*")
    }

    pub fn segments(&self) -> Vec<&str> {
        self.value.split('.').collect()
    }

    /// Last path segment (`name` for `u.name`).
    pub fn name(&self) -> &str {
        self.value.rsplit('.').next().unwrap_or(&self.value)
    }

    /// Everything before the last segment, if any (`u` for `u.name`).
    pub fn qualifier(&self) -> Option<&str> {
        self.value.rsplit_once('.').map(|(qualifier, _)| qualifier)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::{metadata::FieldType, parser::{ast::{Identifier, ResolvedField}, QueryParser}};

    fn field(ty: FieldType) -> ResolvedField {
        ResolvedField { ty, nullable: false, entity: None, property: None }
    }

    #[test]
    pub fn test_identifier_quoted_path() {
        let mut parser = QueryParser::new(r#""Order".id"#).unwrap();
        let identifier = Identifier::parse(&mut parser).unwrap();

        assert_eq!(identifier.value, "Order.id");
        assert!(parser.eof());
    }

    #[test]
    pub fn test_identifier_parts() {
        let identifier = Identifier::new("u.address.city");

        assert_eq!(identifier.segments(), vec!["u", "address", "city"]);
        assert_eq!(identifier.name(), "city");
        assert_eq!(identifier.qualifier(), Some("u.address"));
        assert_eq!(Identifier::new("name").qualifier(), None);
    }

    #[test]
    pub fn test_resolution_happens_once() {
        let mut identifier = Identifier::new("age");

        assert!(identifier.resolve(field(FieldType::Int)));
        assert!(!identifier.resolve(field(FieldType::String)));
        assert_eq!(identifier.resolved().unwrap().ty, FieldType::Int);
    }

    #[test]
    pub fn test_wildcards() {
        assert!(Identifier::new("*").is_wildcard());
        assert!(Identifier::new("u.*").is_wildcard());
        assert!(!Identifier::new("u.name").is_wildcard());
    }

    #[test]
    pub fn test_identifier_rejects_keyword() {
        let mut parser = QueryParser::new("FROM").unwrap();
        let err = Identifier::parse(&mut parser).unwrap_err();
        assert_eq!(err.text, "FROM");
    }
}
