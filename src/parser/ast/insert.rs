use std::fmt;

use crate::parser::{
    ast::{select::write_list, Expression, Identifier, QueryFacts, ResultField, Select, TableExpression},
    ParseError, QueryParser, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// One `Expression::List` per row
    Values(Vec<Expression>),
    Select(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableExpression,
    /// Target columns, each an `Expression::Identifier`
    pub columns: Vec<Expression>,
    pub source: InsertSource,
    pub returning: Vec<ResultField>,
    pub facts: QueryFacts,
}

impl Insert {
    pub fn new(table: TableExpression, columns: Vec<Expression>, source: InsertSource) -> Self {
        Self { table, columns, source, returning: Vec::new(), facts: QueryFacts::default() }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Insert, ParseError> {
        if !COMPARERS.insert_into.consume(parser) {
            return parser.error("Expected INSERT INTO").err();
        }

        let table = TableExpression::parse(parser)?;

        let mut columns = Vec::new();
        if parser.consume_symbol("(") {
            loop {
                columns.push(Expression::Identifier(Identifier::parse(parser)?));
                if !parser.consume_symbol(",") {
                    break;
                }
            }
            parser.expect_symbol(")")?;
        }

        let source = if COMPARERS.values.consume(parser) {
            let mut rows = vec![Self::parse_row(parser)?];
            while parser.consume_symbol(",") {
                rows.push(Self::parse_row(parser)?);
            }
            InsertSource::Values(rows)
        } else if COMPARERS.select.compare(parser) {
            InsertSource::Select(Box::new(Select::parse(parser)?))
        } else {
            return parser.error("Expected VALUES or SELECT").err();
        };

        let returning = if COMPARERS.returning.consume(parser) {
            ResultField::parse_list(parser)?
        } else {
            Vec::new()
        };

        Ok(Insert { table, columns, source, returning, facts: QueryFacts::default() })
    }

    fn parse_row(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        parser.expect_symbol("(")?;
        let mut items = vec![Expression::parse(parser)?];
        while parser.consume_symbol(",") {
            items.push(Expression::parse(parser)?);
        }
        parser.expect_symbol(")")?;
        Ok(Expression::List(items))
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            write_list(f, &self.columns)?;
            write!(f, ")")?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                write!(f, " VALUES ")?;
                write_list(f, rows)?;
            },
            InsertSource::Select(select) => write!(f, " {}", select)?,
        }
        if !self.returning.is_empty() {
            write!(f, " RETURNING ")?;
            write_list(f, &self.returning)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Insert, InsertSource}, QueryParser};

    fn parse(text: &str) -> Insert {
        let mut parser = QueryParser::new(text).unwrap();
        Insert::parse(&mut parser).expect("Failed to parse insert")
    }

    #[test]
    pub fn test_insert_values_rows() {
        let insert = parse("INSERT INTO users (name, age) VALUES ('a', 1), (?, ?) RETURNING id");

        assert_eq!(insert.columns.len(), 2);
        assert!(matches!(&insert.source, InsertSource::Values(rows) if rows.len() == 2));
        assert_eq!(insert.returning.len(), 1);
        assert_eq!(insert.to_string(), "INSERT INTO users (name, age) VALUES ('a', 1), (?, ?) RETURNING id");
    }

    #[test]
    pub fn test_insert_select() {
        let insert = parse("INSERT INTO archive (id) SELECT id FROM users WHERE age > 90");
        assert!(matches!(insert.source, InsertSource::Select(_)));
    }

    #[test]
    pub fn test_insert_requires_source() {
        let mut parser = QueryParser::new("INSERT INTO users (name)").unwrap();
        let err = Insert::parse(&mut parser).unwrap_err();
        assert_eq!(err.message, "Expected VALUES or SELECT");
    }
}
