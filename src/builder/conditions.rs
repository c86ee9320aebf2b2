use serde_json::{Map, Value};

use crate::{analyzer::AnalyzerError, parser::ast::{Expression, LogicOp}};

/// One entry of a condition map.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `"property [operator]" => value`; the operator defaults to `=`
    Field { key: String, value: Value },
    /// Parenthesized sub-map
    Group(Conditions),
    /// Expression built elsewhere, taken as is
    Raw(Expression),
    /// Connective joining the previous entry to the next one
    Connective(LogicOp),
}

/// Ordered condition entries, joined with `AND` unless a connective says
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<Condition>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.entries.push(Condition::Field { key: key.to_string(), value });
        self
    }

    pub fn group(mut self, group: Conditions) -> Self {
        self.entries.push(Condition::Group(group));
        self
    }

    pub fn raw(mut self, expression: Expression) -> Self {
        self.entries.push(Condition::Raw(expression));
        self
    }

    pub fn and(mut self) -> Self {
        self.entries.push(Condition::Connective(LogicOp::And));
        self
    }

    pub fn or(mut self) -> Self {
        self.entries.push(Condition::Connective(LogicOp::Or));
        self
    }

    pub fn entries(&self) -> &[Condition] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn connective(value: &str) -> Option<LogicOp> {
        match value.to_ascii_lowercase().as_str() {
            "and" => Some(LogicOp::And),
            "or" => Some(LogicOp::Or),
            _ => None,
        }
    }

    /// Entry under a numeric key: a nested group or a connective marker.
    fn positional(key: &str, value: &Value) -> Result<Condition, AnalyzerError> {
        match value {
            Value::Object(map) => Ok(Condition::Group(Conditions::try_from(map)?)),
            Value::Array(items) => {
                let mut group = Conditions::new();
                for item in items {
                    group.entries.push(Self::positional(key, item)?);
                }
                Ok(Condition::Group(group))
            },
            Value::String(marker) => Self::connective(marker)
                .map(Condition::Connective)
                .ok_or_else(|| AnalyzerError::QueryConstruction(format!("unknown connective '{}' at key {}", marker, key))),
            other => Err(AnalyzerError::QueryConstruction(format!("unexpected {} at key {}", other, key))),
        }
    }
}

impl TryFrom<&Map<String, Value>> for Conditions {
    type Error = AnalyzerError;

    fn try_from(map: &Map<String, Value>) -> Result<Self, Self::Error> {
        let mut conditions = Conditions::new();
        for (key, value) in map {
            let entry = if key.parse::<usize>().is_ok() {
                Self::positional(key, value)?
            } else {
                Condition::Field { key: key.clone(), value: value.clone() }
            };
            conditions.entries.push(entry);
        }
        Ok(conditions)
    }
}

impl TryFrom<&Value> for Conditions {
    type Error = AnalyzerError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Conditions::try_from(map),
            other => Err(AnalyzerError::QueryConstruction(format!("conditions must be an object, got {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{builder::{Condition, Conditions}, parser::ast::LogicOp};

    #[test]
    pub fn test_from_json_keeps_order() {
        let conditions = Conditions::try_from(&json!({
            "status": "active",
            "age >": 18,
            "0": "or",
            "1": { "name LIKE": "a%" },
        })).unwrap();

        let entries = conditions.entries();
        assert_eq!(entries.len(), 4);
        assert!(matches!(&entries[0], Condition::Field { key, .. } if key == "status"));
        assert!(matches!(&entries[1], Condition::Field { key, .. } if key == "age >"));
        assert_eq!(entries[2], Condition::Connective(LogicOp::Or));
        assert!(matches!(&entries[3], Condition::Group(group) if group.entries().len() == 1));
    }

    #[test]
    pub fn test_bad_markers() {
        assert!(Conditions::try_from(&json!({ "0": "xor" })).is_err());
        assert!(Conditions::try_from(&json!({ "0": 5 })).is_err());
        assert!(Conditions::try_from(&json!([1, 2])).is_err());
    }

    #[test]
    pub fn test_fluent_construction() {
        let conditions = Conditions::new().field("a", json!(1)).or().field("b", json!(2));
        assert_eq!(conditions.entries().len(), 3);
        assert!(!conditions.is_empty());
    }
}
