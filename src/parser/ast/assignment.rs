use std::fmt;

use crate::parser::{ast::{Expression, Identifier}, ParseError, QueryParser};

/// `target = value` inside `UPDATE .. SET`. The target is always an
/// `Expression::Identifier`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Expression,
    pub value: Expression,
}

impl Assignment {
    pub fn parse(parser: &mut QueryParser) -> Result<Assignment, ParseError> {
        let target = Expression::Identifier(Identifier::parse(parser)?);
        parser.expect_symbol("=")?;
        let value = Expression::parse(parser)?;

        Ok(Assignment { target, value })
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}
