use std::fmt;

use crate::parser::{ast::Expression, ParseError, QueryParser, COMPARERS};

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub when: Expression,
    pub then: Expression,
}

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    pub operand: Option<Expression>,
    pub branches: Vec<CaseBranch>,
    pub otherwise: Option<Expression>,
}

impl CaseExpression {
    pub fn is_case(parser: &QueryParser) -> bool {
        COMPARERS.case.compare(parser)
    }

    pub fn parse(parser: &mut QueryParser) -> Result<CaseExpression, ParseError> {
        if !COMPARERS.case.consume(parser) {
            return parser.error("Expected CASE").err();
        }

        let operand = if COMPARERS.when.compare(parser) {
            None
        } else {
            Some(Expression::parse(parser)?)
        };

        let mut branches = Vec::new();
        while COMPARERS.when.consume(parser) {
            let when = Expression::parse(parser)?;
            if !COMPARERS.then.consume(parser) {
                return parser.error("Expected THEN").err();
            }
            let then = Expression::parse(parser)?;
            branches.push(CaseBranch { when, then });
        }

        if branches.is_empty() {
            return parser.error("Expected WHEN").err();
        }

        let otherwise = if COMPARERS.r#else.consume(parser) {
            Some(Expression::parse(parser)?)
        } else {
            None
        };

        if !COMPARERS.end.consume(parser) {
            return parser.error("Expected END").err();
        }

        Ok(CaseExpression { operand, branches, otherwise })
    }
}

impl fmt::Display for CaseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CASE")?;
        if let Some(operand) = &self.operand {
            write!(f, " {}", operand)?;
        }
        for branch in &self.branches {
            write!(f, " WHEN {} THEN {}", branch.when, branch.then)?;
        }
        if let Some(otherwise) = &self.otherwise {
            write!(f, " ELSE {}", otherwise)?;
        }
        write!(f, " END")
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{ast::CaseExpression, QueryParser};

    #[test]
    pub fn test_searched_case() {
        let text = "CASE WHEN age < 18 THEN 'minor' WHEN age < 65 THEN 'adult' ELSE 'senior' END";
        let mut parser = QueryParser::new(text).unwrap();
        let case = CaseExpression::parse(&mut parser).unwrap();

        assert!(case.operand.is_none());
        assert_eq!(case.branches.len(), 2);
        assert!(case.otherwise.is_some());
        assert_eq!(case.to_string(), text);
    }

    #[test]
    pub fn test_simple_case() {
        let mut parser = QueryParser::new("CASE status WHEN 1 THEN 'on' END").unwrap();
        let case = CaseExpression::parse(&mut parser).unwrap();

        assert!(case.operand.is_some());
        assert!(case.otherwise.is_none());
    }

    #[test]
    pub fn test_case_requires_end() {
        let mut parser = QueryParser::new("CASE WHEN a THEN b").unwrap();
        let err = CaseExpression::parse(&mut parser).unwrap_err();
        assert_eq!(err.message, "Expected END");
    }
}
