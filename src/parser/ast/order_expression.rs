use std::fmt;

use crate::parser::{ast::Expression, ParseError, QueryParser, COMPARERS};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpression {
    pub expression: Expression,
    pub ascending: bool,
}

impl OrderExpression {
    pub fn parse(parser: &mut QueryParser) -> Result<OrderExpression, ParseError> {
        let expression = Expression::parse(parser)?;

        let ascending = if COMPARERS.desc.consume(parser) {
            false
        } else {
            COMPARERS.asc.consume(parser);
            true
        };

        Ok(OrderExpression { expression, ascending })
    }

    /// Items after an already consumed `ORDER BY`.
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<OrderExpression>, ParseError> {
        let mut items = vec![Self::parse(parser)?];
        while parser.consume_symbol(",") {
            items.push(Self::parse(parser)?);
        }
        Ok(items)
    }
}

impl fmt::Display for OrderExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.expression, if self.ascending { "ASC" } else { "DESC" })
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::OrderExpression, QueryParser};

    #[test]
    pub fn test_order_by_directions() {
        let mut parser = QueryParser::new("name, age DESC, id asc").unwrap();
        let items = OrderExpression::parse_list(&mut parser).unwrap();

        assert_eq!(items.len(), 3);
        assert!(items[0].ascending);
        assert!(!items[1].ascending);
        assert!(items[2].ascending);
        assert!(parser.eof());
    }
}
