use thiserror::Error;

use crate::{analyzer::AnalyzerError, parser::ParseError};

/// Broken compiler invariants. Seeing one of these is a bug in the compiler,
/// never in the query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("Node {0} cannot be rendered here")]
    UnknownNode(String),

    #[error("Named parameter :{0} reached the renderer")]
    UnresolvedNamedParameter(String),

    #[error("Parameter reference without an ordinal reached the renderer")]
    UnnumberedParameter,

    #[error("Cannot replace a {slot} node with a {replacement} node")]
    MismatchedReplacement { slot: String, replacement: String },

    #[error("Walk stack unbalanced: {0}")]
    UnbalancedWalk(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Query(#[from] AnalyzerError),

    #[error("Internal compiler error: {0}")]
    Internal(#[from] InternalError),
}

impl CompileError {
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_))
    }
}
