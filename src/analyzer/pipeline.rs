use std::sync::Arc;

use tracing::debug;

use crate::{
    analyzer::{EntityResolver, IdentifierResolver, JoinResolver, ParameterResolver, ResultMapping, SubqueryMapping},
    compile_error::CompileError,
    config::Config,
    metadata::MetadataProvider,
    parser::ast::Query,
    walker::Walker,
};

/// The resolution passes, each a separate walk over the tree, in the order
/// they depend on each other.
pub struct Pipeline {
    passes: Vec<Walker>,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn MetadataProvider>, config: &Config) -> Self {
        let passes = vec![
            Walker::new(vec![Box::new(EntityResolver::new(Arc::clone(&provider), config.strict_tables))]),
            Walker::new(vec![Box::new(SubqueryMapping)]),
            Walker::new(vec![Box::new(JoinResolver::new(provider))]),
            Walker::new(vec![Box::new(IdentifierResolver)]),
            Walker::new(vec![Box::new(ResultMapping)]),
            Walker::new(vec![Box::new(ParameterResolver)]),
        ];
        Self { passes }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().flat_map(Walker::names).collect()
    }

    pub fn run(&self, query: &mut Query) -> Result<(), CompileError> {
        for pass in &self.passes {
            debug!(pass = ?pass.names(), kind = query.kind(), "resolution pass");
            pass.walk(query)?;
        }
        Ok(())
    }
}
