use std::fmt;

use crate::parser::{ast::{Expression, TableExpression}, ParseError, QueryParser};

#[derive(Debug, Clone, PartialEq)]
pub struct ResultField {
    pub expression: Expression,
    pub alias: Option<String>,
}

impl ResultField {
    pub fn new(expression: Expression, alias: Option<&str>) -> Self {
        Self { expression, alias: alias.map(str::to_string) }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<ResultField, ParseError> {
        let expression = Expression::parse(parser)?;
        let alias = TableExpression::parse_alias(parser)?;

        Ok(ResultField { expression, alias })
    }

    /// Comma separated list with at least one entry.
    pub fn parse_list(parser: &mut QueryParser) -> Result<Vec<ResultField>, ParseError> {
        let mut fields = vec![Self::parse(parser)?];
        while parser.consume_symbol(",") {
            fields.push(Self::parse(parser)?);
        }
        Ok(fields)
    }

    pub fn is_wildcard(&self) -> bool {
        self.expression.as_identifier().is_some_and(|i| i.is_wildcard())
    }
}

impl fmt::Display for ResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.expression, alias),
            None => write!(f, "{}", self.expression),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::ResultField, QueryParser};

    #[test]
    pub fn test_result_fields_with_aliases() {
        let mut parser = QueryParser::new("u.name AS n, COUNT(*) total, u.*").unwrap();
        let fields = ResultField::parse_list(&mut parser).unwrap();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].alias.as_deref(), Some("n"));
        assert_eq!(fields[1].alias.as_deref(), Some("total"));
        assert!(fields[2].is_wildcard());
        assert_eq!(fields[1].to_string(), "COUNT(*) AS total");
    }
}
