#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Reuse compiled queries for repeated query text
    pub memoize: bool,
    /// Reject table names that match no entity instead of passing them through
    pub strict_tables: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { memoize: true, strict_tables: false }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict_tables: true, ..Self::default() }
    }

    pub fn no_cache() -> Self {
        Self { memoize: false, ..Self::default() }
    }
}
