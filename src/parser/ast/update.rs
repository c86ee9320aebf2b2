use std::fmt;

use crate::parser::{
    ast::{select::{write_list, write_tail}, Assignment, Expression, OrderExpression, QueryFacts, TableExpression},
    ParseError, QueryParser, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: TableExpression,
    pub assignments: Vec<Assignment>,
    pub criteria: Option<Expression>,
    pub order_by: Vec<OrderExpression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
    pub facts: QueryFacts,
}

impl Update {
    pub fn new(table: TableExpression) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            criteria: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            facts: QueryFacts::default(),
        }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Update, ParseError> {
        if !COMPARERS.update.consume(parser) {
            return parser.error("Expected UPDATE").err();
        }

        let mut update = Update::new(TableExpression::parse(parser)?);

        if !COMPARERS.set.consume(parser) {
            return parser.error("Expected SET").err();
        }

        update.assignments.push(Assignment::parse(parser)?);
        while parser.consume_symbol(",") {
            update.assignments.push(Assignment::parse(parser)?);
        }

        if COMPARERS.r#where.consume(parser) {
            update.criteria = Some(Expression::parse(parser)?);
        }
        if COMPARERS.order_by.consume(parser) {
            update.order_by = OrderExpression::parse_list(parser)?;
        }
        if COMPARERS.limit.consume(parser) {
            update.limit = Some(Expression::parse(parser)?);
        }
        if COMPARERS.offset.consume(parser) {
            update.offset = Some(Expression::parse(parser)?);
        }

        Ok(update)
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        write_list(f, &self.assignments)?;
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        write_tail(f, &self.order_by, &self.limit, &self.offset)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::Update, QueryParser};

    #[test]
    pub fn test_update_with_tail() {
        let text = "UPDATE users SET name = :name, visits = visits + 1 WHERE id = ? ORDER BY id ASC LIMIT 1";
        let mut parser = QueryParser::new(text).unwrap();
        let update = Update::parse(&mut parser).unwrap();

        assert_eq!(update.assignments.len(), 2);
        assert!(update.criteria.is_some());
        assert_eq!(update.to_string(), text);
    }

    #[test]
    pub fn test_update_requires_set() {
        let mut parser = QueryParser::new("UPDATE users name = 1").unwrap();
        assert!(Update::parse(&mut parser).is_err());
    }
}
