use std::fmt;

use crate::parser::{
    ast::{select::write_tail, Expression, OrderExpression, QueryFacts, TableExpression},
    ParseError, QueryParser, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableExpression,
    pub criteria: Option<Expression>,
    pub order_by: Vec<OrderExpression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
    pub facts: QueryFacts,
}

impl Delete {
    pub fn new(table: TableExpression) -> Self {
        Self { table, criteria: None, order_by: Vec::new(), limit: None, offset: None, facts: QueryFacts::default() }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Delete, ParseError> {
        if !COMPARERS.delete_from.consume(parser) {
            return parser.error("Expected DELETE FROM").err();
        }

        let mut delete = Delete::new(TableExpression::parse(parser)?);

        if COMPARERS.r#where.consume(parser) {
            delete.criteria = Some(Expression::parse(parser)?);
        }
        if COMPARERS.order_by.consume(parser) {
            delete.order_by = OrderExpression::parse_list(parser)?;
        }
        if COMPARERS.limit.consume(parser) {
            delete.limit = Some(Expression::parse(parser)?);
        }
        if COMPARERS.offset.consume(parser) {
            delete.offset = Some(Expression::parse(parser)?);
        }

        Ok(delete)
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        write_tail(f, &self.order_by, &self.limit, &self.offset)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::Delete, QueryParser};

    #[test]
    pub fn test_delete() {
        let text = "DELETE FROM sessions WHERE expires < ? LIMIT 100";
        let mut parser = QueryParser::new(text).unwrap();
        let delete = Delete::parse(&mut parser).unwrap();

        assert!(delete.criteria.is_some());
        assert_eq!(delete.to_string(), text);
    }
}
