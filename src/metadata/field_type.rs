use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::ast::Literal;

/// Logical type of an entity property, a result column or a parameter slot.
///
/// The compiler only needs coarse kinds: enough to pick a binding conversion
/// on the platform side and to report result column types to row decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// SQL NULL literal; never the declared type of a property
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    Time,
    DateTime,
    /// Structured value stored as JSON
    Json,
}

impl FieldType {
    /// Classify a bound `serde_json` value.
    ///
    /// Strings are reported as `String` even when they carry a date; the
    /// declared type of the slot decides whether a date conversion happens.
    pub fn of_value(v: &Value) -> FieldType {
        match v {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    FieldType::Int
                } else {
                    FieldType::Float
                }
            }
            Value::String(_) => FieldType::String,
            Value::Array(_) | Value::Object(_) => FieldType::Json,
        }
    }

    pub fn of_literal(literal: &Literal) -> FieldType {
        match literal {
            Literal::String(_) => FieldType::String,
            Literal::Int(_) => FieldType::Int,
            Literal::Float(_) => FieldType::Float,
            Literal::Bool(_) => FieldType::Bool,
            Literal::Null => FieldType::Null,
        }
    }

    /// Promote two types to a common representative.
    ///
    /// `Int` + `Float` -> `Float`; `Null` yields to the other side; otherwise
    /// the left-hand type wins.
    pub fn promote(a: FieldType, b: FieldType) -> FieldType {
        use FieldType::*;
        if a == b { return a; }
        match (a, b) {
            (Int, Float) | (Float, Int) => Float,
            (Null, y) => y,
            (x, _) => x,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Time | FieldType::DateTime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_of_value() {
        assert_eq!(FieldType::of_value(&json!(1)), FieldType::Int);
        assert_eq!(FieldType::of_value(&json!(1.5)), FieldType::Float);
        assert_eq!(FieldType::of_value(&json!("x")), FieldType::String);
        assert_eq!(FieldType::of_value(&json!(null)), FieldType::Null);
        assert_eq!(FieldType::of_value(&json!([1, 2])), FieldType::Json);
    }

    #[test]
    fn test_promote() {
        assert_eq!(FieldType::promote(FieldType::Int, FieldType::Float), FieldType::Float);
        assert_eq!(FieldType::promote(FieldType::Null, FieldType::String), FieldType::String);
        assert_eq!(FieldType::promote(FieldType::Date, FieldType::String), FieldType::Date);
    }
}
