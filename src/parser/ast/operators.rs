use std::fmt;

use crate::parser::{QueryParser, COMPARERS};

/// Binding strength of operator classes; higher binds tighter.
pub mod precedence {
    pub const LOWEST: u8 = 0;
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    pub const COMPARISON: u8 = 4;
    pub const ADDITIVE: u8 = 5;
    pub const MULTIPLICATIVE: u8 = 6;
    pub const UNARY: u8 = 7;
    pub const ATOM: u8 = 8;

    /// Levels folded by the parser, tightest first.
    pub const BINARY_LEVELS: [u8; 5] = [MULTIPLICATIVE, ADDITIVE, COMPARISON, AND, OR];
}

/// Common surface of the three binary operator families.
pub trait BinaryOperator: Copy + fmt::Display {
    fn precedence(&self) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// String concatenation `||`
    Concat,
}

impl BinaryOperator for ArithmeticOp {
    fn precedence(&self) -> u8 {
        match self {
            ArithmeticOp::Mul | ArithmeticOp::Div | ArithmeticOp::Mod => precedence::MULTIPLICATIVE,
            ArithmeticOp::Add | ArithmeticOp::Sub | ArithmeticOp::Concat => precedence::ADDITIVE,
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
            ArithmeticOp::Concat => "||",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparatorOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    Contains,
    Is,
    IsNot,
    In,
    NotIn,
}

impl ComparatorOp {
    pub fn is_membership(&self) -> bool {
        matches!(self, ComparatorOp::In | ComparatorOp::NotIn)
    }
}

impl TryFrom<&str> for ComparatorOp {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "=" => Ok(ComparatorOp::Eq),
            "!=" | "<>" => Ok(ComparatorOp::NotEq),
            ">" => Ok(ComparatorOp::Gt),
            ">=" => Ok(ComparatorOp::GtEq),
            "<" => Ok(ComparatorOp::Lt),
            "<=" => Ok(ComparatorOp::LtEq),
            "LIKE" => Ok(ComparatorOp::Like),
            "NOT LIKE" => Ok(ComparatorOp::NotLike),
            "CONTAINS" => Ok(ComparatorOp::Contains),
            "IS" => Ok(ComparatorOp::Is),
            "IS NOT" => Ok(ComparatorOp::IsNot),
            "IN" => Ok(ComparatorOp::In),
            "NOT IN" => Ok(ComparatorOp::NotIn),
            _ => Err(format!("Invalid comparer operator: '{}'", value)),
        }
    }
}

impl BinaryOperator for ComparatorOp {
    fn precedence(&self) -> u8 {
        precedence::COMPARISON
    }
}

impl fmt::Display for ComparatorOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparatorOp::Eq => "=",
            ComparatorOp::NotEq => "!=",
            ComparatorOp::Lt => "<",
            ComparatorOp::LtEq => "<=",
            ComparatorOp::Gt => ">",
            ComparatorOp::GtEq => ">=",
            ComparatorOp::Like => "LIKE",
            ComparatorOp::NotLike => "NOT LIKE",
            ComparatorOp::Contains => "CONTAINS",
            ComparatorOp::Is => "IS",
            ComparatorOp::IsNot => "IS NOT",
            ComparatorOp::In => "IN",
            ComparatorOp::NotIn => "NOT IN",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

impl BinaryOperator for LogicOp {
    fn precedence(&self) -> u8 {
        match self {
            LogicOp::And => precedence::AND,
            LogicOp::Or => precedence::OR,
        }
    }
}

impl fmt::Display for LogicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn precedence(&self) -> u8 {
        match self {
            UnaryOp::Not => precedence::NOT,
            UnaryOp::Negate => precedence::UNARY,
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Negate => "-",
        })
    }
}

/// Any binary operator, as read from the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Arithmetic(ArithmeticOp),
    Comparator(ComparatorOp),
    Logic(LogicOp),
}

impl Operator {
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Arithmetic(op) => op.precedence(),
            Operator::Comparator(op) => op.precedence(),
            Operator::Logic(op) => op.precedence(),
        }
    }

    /// Recognize the binary operator at the current position without
    /// consuming it. Returns the operator and how many tokens it spans.
    pub fn check(parser: &QueryParser) -> Option<(Operator, usize)> {
        let token = parser.current();
        if token.kind == crate::parser::TokenKind::Symbol {
            let op = match token.text.as_str() {
                "+" => Operator::Arithmetic(ArithmeticOp::Add),
                "-" => Operator::Arithmetic(ArithmeticOp::Sub),
                "*" => Operator::Arithmetic(ArithmeticOp::Mul),
                "/" => Operator::Arithmetic(ArithmeticOp::Div),
                "%" => Operator::Arithmetic(ArithmeticOp::Mod),
                "||" => Operator::Arithmetic(ArithmeticOp::Concat),
                "=" => Operator::Comparator(ComparatorOp::Eq),
                "!=" | "<>" => Operator::Comparator(ComparatorOp::NotEq),
                "<" => Operator::Comparator(ComparatorOp::Lt),
                "<=" => Operator::Comparator(ComparatorOp::LtEq),
                ">" => Operator::Comparator(ComparatorOp::Gt),
                ">=" => Operator::Comparator(ComparatorOp::GtEq),
                _ => return None,
            };
            return Some((op, 1));
        }

        let keyword_ops = [
            (&COMPARERS.not_like, Operator::Comparator(ComparatorOp::NotLike)),
            (&COMPARERS.not_in, Operator::Comparator(ComparatorOp::NotIn)),
            (&COMPARERS.is_not, Operator::Comparator(ComparatorOp::IsNot)),
            (&COMPARERS.like, Operator::Comparator(ComparatorOp::Like)),
            (&COMPARERS.contains, Operator::Comparator(ComparatorOp::Contains)),
            (&COMPARERS.is, Operator::Comparator(ComparatorOp::Is)),
            (&COMPARERS.r#in, Operator::Comparator(ComparatorOp::In)),
            (&COMPARERS.and, Operator::Logic(LogicOp::And)),
            (&COMPARERS.or, Operator::Logic(LogicOp::Or)),
        ];

        keyword_ops.into_iter()
            .find(|(comparer, _)| comparer.compare(parser))
            .map(|(comparer, op)| (op, comparer.length))
    }
}
