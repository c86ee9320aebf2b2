use std::fmt;

use crate::parser::{
    ast::{Expression, Identifier, Select},
    ParseError, QueryParser, TokenKind, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// Entity or table name as written; rewritten to the physical table once mapped
    Table(String),
    Subquery(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableExpression {
    pub source: TableSource,
    pub alias: Option<String>,
}

impl TableExpression {
    pub fn table(name: &str, alias: Option<&str>) -> Self {
        Self { source: TableSource::Table(name.to_string()), alias: alias.map(str::to_string) }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Table(name) => Some(name),
            TableSource::Subquery(_) => None,
        }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<TableExpression, ParseError> {
        let source = if parser.consume_symbol("(") {
            if !COMPARERS.select.compare(parser) {
                return parser.error("Expected subquery").err();
            }
            let select = Select::parse(parser)?;
            parser.expect_symbol(")")?;
            TableSource::Subquery(Box::new(select))
        } else {
            let identifier = Identifier::parse(parser).map_err(|_| parser.error("Expected table name"))?;
            TableSource::Table(identifier.value)
        };

        let alias = Self::parse_alias(parser)?;

        Ok(TableExpression { source, alias })
    }

    /// `AS name` or a bare trailing identifier.
    pub fn parse_alias(parser: &mut QueryParser) -> Result<Option<String>, ParseError> {
        if COMPARERS.alias.consume(parser) {
            return parser.expect_identifier("Expected alias").map(Some);
        }

        if parser.current().kind == TokenKind::Identifier {
            return parser.expect_identifier("Expected alias").map(Some);
        }

        Ok(None)
    }
}

impl fmt::Display for TableExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            TableSource::Table(name) => write!(f, "{}", name)?,
            TableSource::Subquery(select) => write!(f, "({})", select)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " {}", alias)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
        }
    }
}

/// Marks a join written as relation navigation (`JOIN o.customer c`), whose
/// condition is derived from relation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPath {
    pub source: String,
    pub relation: String,
}

impl RelationPath {
    pub fn split(path: &str) -> Option<RelationPath> {
        let (source, relation) = path.rsplit_once('.')?;
        if source.is_empty() || relation.is_empty() {
            return None;
        }
        Some(RelationPath { source: source.to_string(), relation: relation.to_string() })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableExpression,
    pub condition: Option<Expression>,
    pub relation: Option<RelationPath>,
}

impl Join {
    pub fn is_join(parser: &QueryParser) -> bool {
        COMPARERS.is_join_start(parser)
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Join, ParseError> {
        let kind = if COMPARERS.left_outer_join.consume(parser) || COMPARERS.left_join.consume(parser) {
            JoinKind::Left
        } else if COMPARERS.inner_join.consume(parser) || COMPARERS.join.consume(parser) {
            JoinKind::Inner
        } else {
            return parser.error("Expected JOIN").err();
        };

        let table = TableExpression::parse(parser)?;
        let relation = table.name().and_then(RelationPath::split);

        let condition = if COMPARERS.on.consume(parser) {
            Some(Expression::parse(parser)?)
        } else {
            None
        };

        if condition.is_none() && relation.is_none() {
            return parser.error("Expected ON").err();
        }

        Ok(Join { kind, table, condition, relation })
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.table)?;
        if let Some(condition) = &self.condition {
            write!(f, " ON {}", condition)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Join, JoinKind, RelationPath, TableExpression, TableSource}, QueryParser};

    #[test]
    pub fn test_table_with_alias() {
        let mut parser = QueryParser::new("users AS u").unwrap();
        let table = TableExpression::parse(&mut parser).unwrap();
        assert_eq!(table.name(), Some("users"));
        assert_eq!(table.alias.as_deref(), Some("u"));

        let mut parser = QueryParser::new("users u WHERE").unwrap();
        let table = TableExpression::parse(&mut parser).unwrap();
        assert_eq!(table.alias.as_deref(), Some("u"));

        let mut parser = QueryParser::new("users WHERE").unwrap();
        let table = TableExpression::parse(&mut parser).unwrap();
        assert_eq!(table.alias, None);
    }

    #[test]
    pub fn test_derived_table() {
        let mut parser = QueryParser::new("(SELECT id FROM users) d").unwrap();
        let table = TableExpression::parse(&mut parser).unwrap();
        assert!(matches!(table.source, TableSource::Subquery(_)));
        assert_eq!(table.alias.as_deref(), Some("d"));
    }

    #[test]
    pub fn test_left_outer_join_with_condition() {
        let mut parser = QueryParser::new("LEFT OUTER JOIN orders o ON o.user_id = u.id").unwrap();
        let join = Join::parse(&mut parser).unwrap();

        assert_eq!(join.kind, JoinKind::Left);
        assert!(join.relation.is_none());
        assert_eq!(join.to_string(), "LEFT JOIN orders o ON o.user_id = u.id");
    }

    #[test]
    pub fn test_relation_join_without_condition() {
        let mut parser = QueryParser::new("JOIN o.customer c").unwrap();
        let join = Join::parse(&mut parser).unwrap();

        assert_eq!(join.kind, JoinKind::Inner);
        assert_eq!(join.relation, Some(RelationPath { source: "o".into(), relation: "customer".into() }));
        assert!(join.condition.is_none());
    }

    #[test]
    pub fn test_plain_join_requires_condition() {
        let mut parser = QueryParser::new("JOIN orders o WHERE x = 1").unwrap();
        let err = Join::parse(&mut parser).unwrap_err();
        assert_eq!(err.message, "Expected ON");
        assert_eq!(err.text, "WHERE");
    }
}
