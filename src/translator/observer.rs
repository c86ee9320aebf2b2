use crate::parser::ast::Query;

/// Instrumentation around a compilation. Observers see the tree but cannot
/// change it or fail the compilation.
pub trait CompileObserver: Send + Sync {
    fn before_resolution(&self, _query: &Query) {}

    fn before_rendering(&self, _query: &Query) {}
}
