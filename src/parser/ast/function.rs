use std::fmt;

use crate::parser::{ast::Expression, ParseError, QueryParser, TokenKind, COMPARERS};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
    pub distinct: bool,
}

impl FunctionCall {
    pub fn new(name: &str, args: Vec<Expression>) -> Self {
        Self { name: name.to_string(), args, distinct: false }
    }

    pub fn is_function(parser: &QueryParser) -> bool {
        parser.current().kind == TokenKind::Identifier
            && parser.peek(1).is_some_and(|token| token.is_symbol("("))
    }

    pub fn parse(parser: &mut QueryParser) -> Result<FunctionCall, ParseError> {
        if !Self::is_function(parser) {
            return parser.error("Expected function call").err();
        }

        let name = parser.current().text.clone();
        parser.jump(2);

        let distinct = COMPARERS.distinct.consume(parser);
        let mut args = Vec::new();

        if !parser.consume_symbol(")") {
            loop {
                args.push(Expression::parse(parser)?);
                if !parser.consume_symbol(",") {
                    break;
                }
            }
            parser.expect_symbol(")")?;
        }

        Ok(FunctionCall { name, args, distinct })
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
        if self.distinct {
            write!(f, "{}(DISTINCT {})", self.name, args)
        } else {
            write!(f, "{}({})", self.name, args)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::{Expression, FunctionCall}, QueryParser};

    #[test]
    pub fn test_function_with_args() {
        let mut parser = QueryParser::new("COALESCE(nick, name, 'none')").unwrap();
        let function = FunctionCall::parse(&mut parser).unwrap();

        assert_eq!(function.name, "COALESCE");
        assert_eq!(function.args.len(), 3);
        assert!(parser.eof());
    }

    #[test]
    pub fn test_count_distinct_and_wildcard() {
        let mut parser = QueryParser::new("COUNT(DISTINCT u.id)").unwrap();
        let function = FunctionCall::parse(&mut parser).unwrap();
        assert!(function.distinct);
        assert_eq!(function.to_string(), "COUNT(DISTINCT u.id)");

        let mut parser = QueryParser::new("count(*)").unwrap();
        let function = FunctionCall::parse(&mut parser).unwrap();
        assert!(matches!(&function.args[0], Expression::Identifier(i) if i.value == "*"));
    }

    #[test]
    pub fn test_no_args() {
        let mut parser = QueryParser::new("NOW()").unwrap();
        let function = FunctionCall::parse(&mut parser).unwrap();
        assert!(function.args.is_empty());
    }

    #[test]
    pub fn test_unclosed_call() {
        let mut parser = QueryParser::new("LOWER(name").unwrap();
        assert!(FunctionCall::parse(&mut parser).is_err());
    }
}
