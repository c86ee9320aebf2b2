use crate::platform::{FunctionRegistry, Platform};

/// ANSI spelling: double-quoted identifiers, `?` markers, `LIMIT .. OFFSET`
/// and `RETURNING`.
#[derive(Debug, Clone)]
pub struct GenericPlatform {
    functions: FunctionRegistry,
}

impl GenericPlatform {
    pub fn new() -> Self {
        Self {
            functions: FunctionRegistry::standard().with("length", "CHAR_LENGTH", Some(1)),
        }
    }
}

impl Default for GenericPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }
}
