use crate::platform::{FunctionRegistry, Platform};

#[derive(Debug, Clone)]
pub struct PostgresPlatform {
    functions: FunctionRegistry,
}

impl PostgresPlatform {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::standard()
                .with("length", "LENGTH", Some(1))
                .with("now", "NOW", Some(0))
                .with("substring", "SUBSTR", None),
        }
    }
}

impl Default for PostgresPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for PostgresPlatform {
    fn name(&self) -> &'static str {
        "postgres"
    }

    /// `$1`, `$2`, ...
    fn placeholder(&self, ordinal: usize) -> String {
        format!("${}", ordinal + 1)
    }

    fn generated_value_sql(&self, table: &str, column: &str) -> Option<String> {
        Some(format!(
            "SELECT CURRVAL(pg_get_serial_sequence({}, {}))",
            self.quote_string(table),
            self.quote_string(column)
        ))
    }

    fn datetime_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S%.f"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
