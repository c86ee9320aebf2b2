use std::fmt;

use crate::parser::{
    ast::{
        precedence, ArithmeticOp, BinaryOperator, CaseExpression, ComparatorOp, FunctionCall, Identifier, Literal,
        LogicOp, NamedParameterReference, Operator, ParamParser, ParameterReference, Select, UnaryOp,
    },
    ParseError, QueryParser, TokenKind, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression<Op: BinaryOperator> {
    pub left: Expression,
    pub op: Op,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub operand: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Literal(Literal),
    Parameter(ParameterReference),
    NamedParameter(NamedParameterReference),
    Function(FunctionCall),
    List(Vec<Expression>),
    Arithmetic(Box<BinaryExpression<ArithmeticOp>>),
    Binary(Box<BinaryExpression<ComparatorOp>>),
    Logic(Box<BinaryExpression<LogicOp>>),
    Unary(Box<UnaryExpression>),
    Case(Box<CaseExpression>),
    Subquery(Box<Select>),
}

impl Expression {
    pub fn identifier(value: &str) -> Self {
        Expression::Identifier(Identifier::new(value))
    }

    pub fn arithmetic(left: Expression, op: ArithmeticOp, right: Expression) -> Self {
        Expression::Arithmetic(Box::new(BinaryExpression { left, op, right }))
    }

    pub fn binary(left: Expression, op: ComparatorOp, right: Expression) -> Self {
        Expression::Binary(Box::new(BinaryExpression { left, op, right }))
    }

    pub fn logic(left: Expression, op: LogicOp, right: Expression) -> Self {
        Expression::Logic(Box::new(BinaryExpression { left, op, right }))
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary(Box::new(UnaryExpression { op, operand }))
    }

    /// Fold `parts` into a left-deep chain joined by `op`.
    pub fn join_all(parts: Vec<Expression>, op: LogicOp) -> Option<Expression> {
        parts.into_iter().reduce(|left, right| Expression::logic(left, op, right))
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(identifier) => Some(identifier),
            _ => None,
        }
    }

    /// Identifier itself, or the identifier under a chain of unary operators.
    pub fn underlying_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(identifier) => Some(identifier),
            Expression::Unary(unary) => unary.operand.underlying_identifier(),
            _ => None,
        }
    }

    /// Binding strength of this node as an operand.
    pub fn precedence(&self) -> u8 {
        match self {
            Expression::Arithmetic(e) => e.op.precedence(),
            Expression::Binary(e) => e.op.precedence(),
            Expression::Logic(e) => e.op.precedence(),
            Expression::Unary(e) => e.op.precedence(),
            _ => precedence::ATOM,
        }
    }

    /// Whether this node must be wrapped in parentheses when it appears where
    /// `required` binding strength is expected. A logic child under a logic
    /// parent of the other kind is always wrapped.
    pub fn needs_parens(&self, required: u8, outer: Option<LogicOp>) -> bool {
        if self.precedence() < required {
            return true;
        }

        match (self, outer) {
            (Expression::Logic(inner), Some(op)) => inner.op != op,
            _ => false,
        }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        Self::parse_flat(parser, precedence::LOWEST)
    }

    /// Parse a standalone expression fragment, the whole text must be consumed.
    pub fn parse_fragment(text: &str) -> Result<Expression, ParseError> {
        let mut parser = QueryParser::new(text)?;
        let expression = Self::parse(&mut parser)?;
        parser.finish()?;
        Ok(expression)
    }

    /// [`parse_fragment`](Self::parse_fragment) for text spliced into another
    /// query: only named parameters are accepted.
    pub fn parse_detached(text: &str) -> Result<Expression, ParseError> {
        let mut parser = QueryParser::new(text)?;
        parser.reject_positional()?;
        let expression = Self::parse(&mut parser)?;
        parser.finish()?;
        Ok(expression)
    }

    /// Read `operand (operator operand)*` while operators bind at least as
    /// tight as `min`, then fold the flat buffer level by level.
    fn parse_flat(parser: &mut QueryParser, min: u8) -> Result<Expression, ParseError> {
        let mut operands = vec![Self::parse_operand(parser)?];
        let mut operators = Vec::new();

        while let Some((op, length)) = Operator::check(parser) {
            if op.precedence() < min {
                break;
            }
            parser.jump(length);

            let operand = match op {
                Operator::Comparator(c) if c.is_membership() => Self::parse_membership(parser)?,
                _ => Self::parse_operand(parser)?,
            };
            operators.push(op);
            operands.push(operand);
        }

        Ok(Self::collapse(operands, operators))
    }

    fn collapse(mut operands: Vec<Expression>, mut operators: Vec<Operator>) -> Expression {
        for level in precedence::BINARY_LEVELS {
            let mut i = 0;
            while i < operators.len() {
                if operators[i].precedence() != level {
                    i += 1;
                    continue;
                }

                let op = operators.remove(i);
                let left = operands.remove(i);
                let right = operands.remove(i);
                let folded = match op {
                    Operator::Arithmetic(op) => Expression::arithmetic(left, op, right),
                    Operator::Comparator(op) => Expression::binary(left, op, right),
                    Operator::Logic(op) => Expression::logic(left, op, right),
                };
                operands.insert(i, folded);
            }
        }

        // one operand more than operators, so exactly one is left
        operands.swap_remove(0)
    }

    /// Right-hand side of `IN` / `NOT IN`: a parenthesized list or subquery.
    fn parse_membership(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        if !parser.is_symbol("(") {
            return parser.error("Expected '(' after IN").err();
        }

        match Self::parse_parenthesized(parser)? {
            list @ (Expression::List(_) | Expression::Subquery(_)) => Ok(list),
            single => Ok(Expression::List(vec![single])),
        }
    }

    fn parse_parenthesized(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        parser.expect_symbol("(")?;

        if COMPARERS.select.compare(parser) {
            let select = Select::parse(parser)?;
            parser.expect_symbol(")")?;
            return Ok(Expression::Subquery(Box::new(select)));
        }

        let first = Self::parse(parser)?;
        if parser.consume_symbol(")") {
            return Ok(first);
        }

        let mut items = vec![first];
        while parser.consume_symbol(",") {
            items.push(Self::parse(parser)?);
        }
        parser.expect_symbol(")")?;

        Ok(Expression::List(items))
    }

    fn parse_operand(parser: &mut QueryParser) -> Result<Expression, ParseError> {
        if COMPARERS.not.consume(parser) {
            let operand = Self::parse_flat(parser, precedence::COMPARISON)?;
            return Ok(Expression::unary(UnaryOp::Not, operand));
        }

        if parser.consume_symbol("-") {
            let operand = Self::parse_operand(parser)?;
            return Ok(match operand {
                Expression::Literal(literal) => match literal.clone().negate() {
                    Some(negated) => Expression::Literal(negated),
                    None => Expression::unary(UnaryOp::Negate, Expression::Literal(literal)),
                },
                other => Expression::unary(UnaryOp::Negate, other),
            });
        }

        if parser.consume_symbol("+") {
            return Self::parse_operand(parser);
        }

        if parser.is_symbol("(") {
            return Self::parse_parenthesized(parser);
        }

        if parser.consume_symbol("*") {
            return Ok(Expression::identifier("*"));
        }

        if CaseExpression::is_case(parser) {
            return Ok(Expression::Case(Box::new(CaseExpression::parse(parser)?)));
        }

        if Literal::is_literal(parser) {
            return Literal::parse(parser).map(Expression::Literal);
        }

        if ParamParser::is_param(parser) {
            return ParamParser::parse(parser);
        }

        if FunctionCall::is_function(parser) {
            return FunctionCall::parse(parser).map(Expression::Function);
        }

        if parser.current().kind == TokenKind::Identifier {
            return Identifier::parse(parser).map(Expression::Identifier);
        }

        parser.error("Expected expression").err()
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expression, required: u8, outer: Option<LogicOp>) -> fmt::Result {
    if operand.needs_parens(required, outer) {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

fn write_binary<Op: BinaryOperator>(f: &mut fmt::Formatter<'_>, e: &BinaryExpression<Op>, outer: Option<LogicOp>) -> fmt::Result {
    let level = e.op.precedence();
    write_operand(f, &e.left, level, outer)?;
    write!(f, " {} ", e.op)?;
    write_operand(f, &e.right, level + 1, outer)
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{}", identifier),
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Parameter(parameter) => write!(f, "{}", parameter),
            Expression::NamedParameter(parameter) => write!(f, "{}", parameter),
            Expression::Function(function) => write!(f, "{}", function),
            Expression::List(items) => {
                let items = items.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
                write!(f, "({})", items)
            },
            Expression::Arithmetic(e) => write_binary(f, e, None),
            Expression::Binary(e) => write_binary(f, e, None),
            Expression::Logic(e) => write_binary(f, e, Some(e.op)),
            Expression::Unary(e) => {
                let operand = if e.operand.needs_parens(e.op.precedence(), None) {
                    format!("({})", e.operand)
                } else {
                    e.operand.to_string()
                };
                match e.op {
                    UnaryOp::Not => write!(f, "NOT {}", operand),
                    // `--` would open a line comment
                    UnaryOp::Negate if operand.starts_with('-') => write!(f, "-({})", operand),
                    UnaryOp::Negate => write!(f, "-{}", operand),
                }
            },
            Expression::Case(case) => write!(f, "{}", case),
            Expression::Subquery(select) => write!(f, "({})", select),
        }
    }
}
