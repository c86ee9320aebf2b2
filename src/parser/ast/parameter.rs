use std::fmt;

use serde_json::Value;

use crate::{metadata::FieldType, parser::{ast::Expression, ParseError, QueryParser, TokenKind}};

/// Anonymous parameter placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterReference {
    /// Ordinal among the positional `?` markers of the source text
    pub position: Option<usize>,
    /// Name of the named placeholder this reference was rewritten from
    pub replaces: Option<String>,
    pub ty: Option<FieldType>,
    pub nullable: Option<bool>,
    pub value: Option<Value>,
    /// Native placeholder ordinal, assigned during parameter resolution
    pub id: Option<usize>,
}

impl ParameterReference {
    pub fn positional(position: usize) -> Self {
        Self { position: Some(position), ..Default::default() }
    }

    pub fn with_value(value: Value) -> Self {
        Self { value: Some(value), ..Default::default() }
    }

    pub fn replacing(named: &NamedParameterReference) -> Self {
        Self { replaces: Some(named.name.clone()), ty: named.ty, ..Default::default() }
    }

    pub fn with_type(mut self, ty: FieldType) -> Self {
        self.ty = Some(ty);
        self
    }
}

/// `:name` placeholder; rewritten into a `ParameterReference` before
/// resolution completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParameterReference {
    pub name: String,
    pub ty: Option<FieldType>,
}

impl NamedParameterReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ty: None }
    }
}

pub struct ParamParser;

impl ParamParser {
    pub fn is_param(parser: &QueryParser) -> bool {
        parser.current().kind == TokenKind::Parameter
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        if !Self::is_param(parser) {
            return parser.error("Invalid parameter").err();
        }

        let text = parser.current().text.clone();
        parser.next();

        match text.strip_prefix(':') {
            Some(name) => Ok(Expression::NamedParameter(NamedParameterReference::new(name))),
            None => {
                let position = parser.next_positional();
                Ok(Expression::Parameter(ParameterReference::positional(position)))
            },
        }
    }
}

impl fmt::Display for ParameterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("?")
    }
}

impl fmt::Display for NamedParameterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name)
    }
}

#[cfg(test)]
pub mod tests {
    use crate::parser::{ast::{Expression, ParamParser}, QueryParser};

    #[test]
    pub fn test_param_parser_positional() {
        let mut parser = QueryParser::new("? ?").unwrap();

        match ParamParser::parse(&mut parser).unwrap() {
            Expression::Parameter(p) => assert_eq!(p.position, Some(0)),
            _ => panic!(),
        }
        match ParamParser::parse(&mut parser).unwrap() {
            Expression::Parameter(p) => assert_eq!(p.position, Some(1)),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_param_parser_named() {
        let mut parser = QueryParser::new(":status").unwrap();

        match ParamParser::parse(&mut parser).unwrap() {
            Expression::NamedParameter(p) => assert_eq!(p.name, "status"),
            _ => panic!(),
        }
    }

    #[test]
    pub fn test_param_parser_rejects_identifier() {
        let mut parser = QueryParser::new("status").unwrap();
        assert!(ParamParser::parse(&mut parser).is_err());
    }
}
