use serde_json::{Map, Value};

use crate::{
    analyzer::AnalyzerError,
    builder::{Condition, Conditions},
    compile_error::CompileError,
    parser::{
        ast::{
            Assignment, ComparatorOp, Expression, Literal, LogicOp, OrderExpression, ParameterReference, ResultField,
        },
        QueryParser,
    },
};

/// Operators accepted in condition keys.
const CONDITION_OPERATORS: [ComparatorOp; 10] = [
    ComparatorOp::Eq,
    ComparatorOp::NotEq,
    ComparatorOp::Gt,
    ComparatorOp::GtEq,
    ComparatorOp::Lt,
    ComparatorOp::LtEq,
    ComparatorOp::Like,
    ComparatorOp::Contains,
    ComparatorOp::In,
    ComparatorOp::NotIn,
];

/// Builds AST fragments from structured input. Every value becomes a
/// positional parameter whose argument is appended to `arguments`.
#[derive(Debug, Default)]
pub struct AstBuilder {
    arguments: Vec<Value>,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn into_arguments(self) -> Vec<Value> {
        self.arguments
    }

    pub fn parameter(&mut self, value: Value) -> Expression {
        self.arguments.push(value);
        Expression::Parameter(ParameterReference::positional(self.arguments.len() - 1))
    }

    /// Fold a condition map into one expression; `None` when it is empty.
    pub fn conditions(&mut self, conditions: &Conditions) -> Result<Option<Expression>, AnalyzerError> {
        let mut folded: Option<Expression> = None;
        let mut connective = LogicOp::And;

        for entry in conditions.entries() {
            let expression = match entry {
                Condition::Connective(op) => {
                    connective = *op;
                    continue;
                },
                Condition::Field { key, value } => self.condition(key, value)?,
                Condition::Group(group) => match self.conditions(group)? {
                    Some(expression) => expression,
                    None => continue,
                },
                Condition::Raw(expression) => expression.clone(),
            };

            folded = Some(match folded {
                Some(left) => Expression::logic(left, connective, expression),
                None => expression,
            });
            connective = LogicOp::And;
        }

        Ok(folded)
    }

    /// `"property [operator]" => value`.
    pub fn condition(&mut self, key: &str, value: &Value) -> Result<Expression, AnalyzerError> {
        let key = key.trim();
        let (property, operator) = match key.split_once(char::is_whitespace) {
            Some((property, operator)) => (property, operator.trim()),
            None => (key, "="),
        };

        let op = ComparatorOp::try_from(operator)
            .ok()
            .filter(|op| CONDITION_OPERATORS.contains(op))
            .ok_or_else(|| AnalyzerError::InvalidOperator { operator: operator.to_string(), condition: key.to_string() })?;
        let field = Expression::identifier(property);

        if op.is_membership() {
            let right = self.membership(property, value)?;
            return Ok(Expression::binary(field, op, right));
        }

        match (op, value) {
            (ComparatorOp::Eq, Value::Null) => Ok(Expression::binary(field, ComparatorOp::Is, Expression::Literal(Literal::Null))),
            (ComparatorOp::NotEq, Value::Null) => Ok(Expression::binary(field, ComparatorOp::IsNot, Expression::Literal(Literal::Null))),
            (_, Value::Null) => Err(AnalyzerError::InvalidValue { value: "null".into(), target: format!("{} operand", op) }),
            _ => {
                let parameter = self.parameter(value.clone());
                Ok(Expression::binary(field, op, parameter))
            },
        }
    }

    fn membership(&mut self, property: &str, value: &Value) -> Result<Expression, AnalyzerError> {
        let invalid = |reason: &str| AnalyzerError::InvalidInOperand { field: property.to_string(), reason: reason.to_string() };

        let Value::Array(items) = value else {
            return Err(invalid("expected an array of values"));
        };
        if items.is_empty() {
            return Err(invalid("empty list"));
        }
        if items.iter().any(|item| item.is_array() || item.is_object()) {
            return Err(invalid("list items must be scalars"));
        }

        Ok(Expression::List(items.iter().map(|item| self.parameter(item.clone())).collect()))
    }

    /// One VALUES row; `columns` fixes the order in which `row` is read.
    pub fn values_row(&mut self, columns: &[String], row: &Map<String, Value>) -> Result<Expression, AnalyzerError> {
        let mut items = Vec::with_capacity(columns.len());
        for column in columns {
            let value = row.get(column).ok_or_else(|| {
                AnalyzerError::QueryConstruction(format!("row has no value for column {}", column))
            })?;
            items.push(self.parameter(value.clone()));
        }
        if row.len() != columns.len() {
            return Err(AnalyzerError::QueryConstruction("rows must all set the same columns".into()));
        }
        Ok(Expression::List(items))
    }

    pub fn assignments(&mut self, values: &Map<String, Value>) -> Vec<Assignment> {
        values.iter()
            .map(|(property, value)| Assignment {
                target: Expression::identifier(property),
                value: self.parameter(value.clone()),
            })
            .collect()
    }

    /// Result fields written in query syntax (`name`, `COUNT(*) AS total`).
    pub fn result_fields(fields: &[&str]) -> Result<Vec<ResultField>, CompileError> {
        let mut parsed = Vec::with_capacity(fields.len());
        for text in fields {
            let mut parser = QueryParser::new(text)?;
            parser.reject_positional()?;
            parsed.push(ResultField::parse(&mut parser)?);
            parser.finish()?;
        }
        Ok(parsed)
    }

    /// `name`, `name DESC`.
    pub fn order(text: &str) -> Result<OrderExpression, CompileError> {
        let mut parser = QueryParser::new(text)?;
        parser.reject_positional()?;
        let order = OrderExpression::parse(&mut parser)?;
        parser.finish()?;
        Ok(order)
    }

    pub fn limit(value: u64) -> Expression {
        Expression::Literal(Literal::Int(i64::try_from(value).unwrap_or(i64::MAX)))
    }
}
