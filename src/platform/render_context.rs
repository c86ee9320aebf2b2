use crate::parser::ast::{precedence, Expression, LogicOp};

/// Binding requirements of the position an expression is rendered into.
/// Passed down by value, one per recursion level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Weakest operator allowed without parentheses
    pub required: u8,
    /// Logic operator of the enclosing chain, if any
    pub logic: Option<LogicOp>,
}

impl RenderContext {
    pub fn top() -> Self {
        Self { required: precedence::LOWEST, logic: None }
    }

    pub fn left_of(level: u8, logic: Option<LogicOp>) -> Self {
        Self { required: level, logic }
    }

    /// Right operands need one level more, so `a - (b - c)` keeps its
    /// parentheses.
    pub fn right_of(level: u8, logic: Option<LogicOp>) -> Self {
        Self { required: level + 1, logic }
    }

    pub fn wraps(&self, expression: &Expression) -> bool {
        expression.needs_parens(self.required, self.logic)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::top()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::{precedence, Expression, LogicOp};

    use super::RenderContext;

    #[test]
    pub fn test_wrapping_rules() {
        let sum = Expression::parse_fragment("a + b").unwrap();
        let product = Expression::parse_fragment("a * b").unwrap();
        let conjunction = Expression::parse_fragment("a AND b").unwrap();

        assert!(!RenderContext::top().wraps(&sum));
        assert!(RenderContext::left_of(precedence::MULTIPLICATIVE, None).wraps(&sum));
        assert!(!RenderContext::right_of(precedence::ADDITIVE, None).wraps(&product));
        assert!(RenderContext::left_of(precedence::OR, Some(LogicOp::Or)).wraps(&conjunction));
        assert!(!RenderContext::left_of(precedence::AND, Some(LogicOp::And)).wraps(&conjunction));
    }
}
