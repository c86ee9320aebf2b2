use std::collections::HashMap;

/// Native spelling of a portable function, optionally bound to one arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFunction {
    pub name: String,
    pub arity: Option<usize>,
}

/// Case-insensitive map from portable function names to a dialect's own.
/// Calls with no entry, or with an arity the entry does not accept, are
/// rendered as written.
#[derive(Debug, Default, Clone)]
pub struct FunctionRegistry {
    by_name: HashMap<String, NativeFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    pub fn register(&mut self, portable: &str, native: &str, arity: Option<usize>) {
        self.by_name.insert(
            portable.to_ascii_lowercase(),
            NativeFunction { name: native.to_string(), arity },
        );
    }

    pub fn with(mut self, portable: &str, native: &str, arity: Option<usize>) -> Self {
        self.register(portable, native, arity);
        self
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.by_name.get(&name.to_ascii_lowercase())
    }

    /// Native name for a call with `argc` arguments.
    pub fn native(&self, name: &str, argc: usize) -> Option<&str> {
        self.get(name)
            .filter(|f| f.arity.is_none_or(|arity| arity == argc))
            .map(|f| f.name.as_str())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Aggregates and string functions every dialect spells the same way.
    pub fn standard() -> Self {
        Self::new()
            .with("count", "COUNT", Some(1))
            .with("sum", "SUM", Some(1))
            .with("avg", "AVG", Some(1))
            .with("min", "MIN", Some(1))
            .with("max", "MAX", Some(1))
            .with("upper", "UPPER", Some(1))
            .with("lower", "LOWER", Some(1))
            .with("trim", "TRIM", Some(1))
            .with("abs", "ABS", Some(1))
            .with("coalesce", "COALESCE", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::standard();
        assert_eq!(registry.native("Count", 1), Some("COUNT"));
        assert_eq!(registry.native("coalesce", 4), Some("COALESCE"));
    }

    #[test]
    pub fn test_arity_mismatch_falls_through() {
        let registry = FunctionRegistry::standard().with("length", "CHAR_LENGTH", Some(1));
        assert_eq!(registry.native("length", 1), Some("CHAR_LENGTH"));
        assert_eq!(registry.native("length", 2), None);
        assert_eq!(registry.native("soundex", 1), None);
    }

    #[test]
    pub fn test_list_is_sorted() {
        let registry = FunctionRegistry::new().with("b", "B", None).with("a", "A", None);
        assert_eq!(registry.list(), vec!["a", "b"]);
    }
}
