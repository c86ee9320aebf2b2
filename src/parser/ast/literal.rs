use ordered_float::NotNan;
use serde_json::{Number, Value};
use std::fmt::{self, Display};

use crate::parser::{ParseError, QueryParser, TokenKind, COMPARERS};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(NotNan<f64>),
    Bool(bool),
    Null,
}

impl Literal {
    pub fn is_literal(parser: &QueryParser) -> bool {
        parser.current().kind == TokenKind::Literal
            || COMPARERS.b_true.compare(parser)
            || COMPARERS.b_false.compare(parser)
            || COMPARERS.null.compare(parser)
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Literal, ParseError> {
        if COMPARERS.b_true.consume(parser) {
            return Ok(Literal::Bool(true));
        }
        if COMPARERS.b_false.consume(parser) {
            return Ok(Literal::Bool(false));
        }
        if COMPARERS.null.consume(parser) {
            return Ok(Literal::Null);
        }

        let token = parser.current();
        if token.kind != TokenKind::Literal {
            return parser.error("Invalid literal").err();
        }

        let literal = if let Some(quoted) = token.text.strip_prefix('\'') {
            let inner = quoted.strip_suffix('\'').unwrap_or(quoted);
            Literal::String(inner.replace("''", "'"))
        } else if let Ok(int) = token.text.parse::<i64>() {
            Literal::Int(int)
        } else {
            let float = token.text.parse::<f64>().ok().and_then(|f| NotNan::new(f).ok());
            match float {
                Some(float) => Literal::Float(float),
                None => return parser.error("Invalid number").err(),
            }
        };

        parser.next();
        Ok(literal)
    }

    pub fn negate(self) -> Option<Literal> {
        match self {
            Literal::Int(i) => i.checked_neg().map(Literal::Int),
            Literal::Float(f) => Some(Literal::Float(-f)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Int(i) => Value::Number(Number::from(*i)),
            Literal::Float(f) => Number::from_f64(f.into_inner()).map(Value::Number).unwrap_or(Value::Null),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }

    /// Scalar JSON values map to literals; arrays and objects do not.
    pub fn from_value(value: &Value) -> Option<Literal> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Literal::Int(i)),
                None => n.as_f64().and_then(|f| NotNan::new(f).ok()).map(Literal::Float),
            },
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(n) => write!(f, "{}", n.into_inner()),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::parser::{ast::Literal, QueryParser};

    fn parse(text: &str) -> Literal {
        let mut parser = QueryParser::new(text).unwrap();
        Literal::parse(&mut parser).expect("Failed to parse literal")
    }

    #[test]
    pub fn test_literal_kinds() {
        assert_eq!(parse("'it''s'"), Literal::String("it's".into()));
        assert_eq!(parse("42"), Literal::Int(42));
        assert!(matches!(parse("4.5"), Literal::Float(f) if f.into_inner() == 4.5));
        assert_eq!(parse("true"), Literal::Bool(true));
        assert_eq!(parse("FALSE"), Literal::Bool(false));
        assert_eq!(parse("null"), Literal::Null);
    }

    #[test]
    pub fn test_literal_display_escapes() {
        assert_eq!(Literal::String("it's".into()).to_string(), "'it''s'");
        assert_eq!(Literal::Null.to_string(), "NULL");
    }

    #[test]
    pub fn test_value_conversion() {
        assert_eq!(Literal::from_value(&json!(3)), Some(Literal::Int(3)));
        assert_eq!(Literal::from_value(&json!([1])), None);
        assert_eq!(Literal::String("a".into()).to_value(), json!("a"));
    }
}
