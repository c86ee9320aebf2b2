use serde_json::Value;

use crate::{
    analyzer::AnalyzerError,
    compile_error::CompileError,
    metadata::FieldType,
    parser::ast::Query,
    platform::{
        bound_value, parse_bool, parse_date, parse_datetime, parse_time, FunctionRegistry, SqlRenderer,
        DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT,
    },
};

/// A database dialect: how resolved queries are spelled and how bound
/// values cross the driver boundary.
///
/// Implementations hold no per-compilation state, so one instance serves
/// any number of concurrent compilations.
pub trait Platform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quote each segment of a dotted name; `*` stays bare.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        name.split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    let escaped = part.replace(close, &format!("{}{}", close, close));
                    format!("{}{}{}", open, escaped, close)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Native marker for the parameter with the given 0-based ordinal.
    fn placeholder(&self, _ordinal: usize) -> String {
        "?".to_string()
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    fn supports_returning(&self) -> bool {
        true
    }

    /// Statement fetching the key generated by the last insert into `table`.
    fn generated_value_sql(&self, _table: &str, _column: &str) -> Option<String> {
        None
    }

    /// Trailing pagination clause, already rendered operands.
    fn pagination(&self, limit: Option<&str>, offset: Option<&str>) -> String {
        let mut sql = String::new();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }

    fn concat(&self, parts: &[&str]) -> String {
        parts.join(" || ")
    }

    /// `left CONTAINS right`: substring match.
    fn contains(&self, left: &str, right: &str) -> String {
        format!("{} LIKE {}", left, self.concat(&["'%'", right, "'%'"]))
    }

    fn functions(&self) -> &FunctionRegistry;

    fn datetime_format(&self) -> &'static str {
        DATETIME_FORMAT
    }

    /// Convert a bound value to what the driver expects for a slot of type `ty`.
    fn to_database(&self, value: &Value, ty: Option<FieldType>) -> Result<Value, AnalyzerError> {
        bound_value(value, ty, self.datetime_format())
    }

    /// Convert a fetched column value back to its portable form.
    fn from_database(&self, value: &Value, ty: FieldType) -> Result<Value, AnalyzerError> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match ty {
            FieldType::Bool => Ok(Value::Bool(parse_bool(value)?)),
            FieldType::Date => Ok(Value::String(parse_date(value)?.format(DATE_FORMAT).to_string())),
            FieldType::Time => Ok(Value::String(parse_time(value)?.format(TIME_FORMAT).to_string())),
            FieldType::DateTime => {
                Ok(Value::String(parse_datetime(value)?.format("%Y-%m-%dT%H:%M:%S").to_string()))
            },
            _ => Ok(value.clone()),
        }
    }

    fn render(&self, query: &Query) -> Result<String, CompileError> {
        SqlRenderer::new(self).render(query)
    }
}
