use serde_json::Value;

use crate::{
    analyzer::AnalyzerError,
    metadata::FieldType,
    platform::{bound_value, parse_bool, FunctionRegistry, Platform},
};

/// Largest row count MySQL accepts, for an OFFSET without a LIMIT.
const UNBOUNDED_LIMIT: &str = "18446744073709551615";

#[derive(Debug, Clone)]
pub struct MySqlPlatform {
    functions: FunctionRegistry,
}

impl MySqlPlatform {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::standard()
                .with("length", "CHAR_LENGTH", Some(1))
                .with("now", "NOW", Some(0))
                .with("substring", "SUBSTRING", None),
        }
    }
}

impl Default for MySqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MySqlPlatform {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn bool_literal(&self, value: bool) -> String {
        if value { "1".to_string() } else { "0".to_string() }
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn generated_value_sql(&self, _table: &str, _column: &str) -> Option<String> {
        Some("SELECT LAST_INSERT_ID()".to_string())
    }

    /// `LIMIT offset, count`
    fn pagination(&self, limit: Option<&str>, offset: Option<&str>) -> String {
        match (limit, offset) {
            (Some(limit), Some(offset)) => format!(" LIMIT {}, {}", offset, limit),
            (Some(limit), None) => format!(" LIMIT {}", limit),
            (None, Some(offset)) => format!(" LIMIT {}, {}", offset, UNBOUNDED_LIMIT),
            (None, None) => String::new(),
        }
    }

    fn concat(&self, parts: &[&str]) -> String {
        format!("CONCAT({})", parts.join(", "))
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    fn to_database(&self, value: &Value, ty: Option<FieldType>) -> Result<Value, AnalyzerError> {
        match ty {
            Some(FieldType::Bool) if !value.is_null() => Ok(Value::from(i64::from(parse_bool(value)?))),
            _ => bound_value(value, ty, self.datetime_format()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        analyzer::Pipeline,
        config::Config,
        fixtures,
        metadata::FieldType,
        parser::ast::Query,
        platform::{MySqlPlatform, Platform},
    };

    fn compile(text: &str) -> String {
        let mut query = Query::try_from(text).unwrap();
        Pipeline::new(fixtures::provider(), &Config::default()).run(&mut query).unwrap();
        MySqlPlatform::new().render(&query).unwrap()
    }

    #[test]
    pub fn test_backticks_and_pagination() {
        assert_eq!(
            compile("SELECT m.id FROM Member m WHERE m.active = TRUE ORDER BY m.id DESC LIMIT 10 OFFSET 30"),
            "SELECT `m`.`id` FROM `members` `m` WHERE `m`.`active` = 1 ORDER BY `m`.`id` DESC LIMIT 30, 10"
        );
        assert_eq!(MySqlPlatform::new().pagination(None, Some("5")), " LIMIT 5, 18446744073709551615");
    }

    #[test]
    pub fn test_contains_uses_concat() {
        assert_eq!(
            compile("SELECT t.id FROM Tag t WHERE t.label CONTAINS ?"),
            "SELECT `t`.`id` FROM `tags` `t` WHERE `t`.`label` LIKE CONCAT('%', ?, '%')"
        );
    }

    #[test]
    pub fn test_no_returning_clause() {
        let platform = MySqlPlatform::new();
        assert!(!platform.supports_returning());
        assert_eq!(platform.generated_value_sql("users", "id").as_deref(), Some("SELECT LAST_INSERT_ID()"));
        assert_eq!(
            compile("INSERT INTO User (name) VALUES (?) RETURNING id"),
            "INSERT INTO `users` (`name`) VALUES (?)"
        );
    }

    #[test]
    pub fn test_boolean_values() {
        let platform = MySqlPlatform::new();
        assert_eq!(platform.to_database(&json!(true), Some(FieldType::Bool)).unwrap(), json!(1));
        assert_eq!(platform.from_database(&json!(0), FieldType::Bool).unwrap(), json!(false));
        assert_eq!(platform.to_database(&json!("2024-01-02"), Some(FieldType::Date)).unwrap(), json!("2024-01-02"));
    }
}
