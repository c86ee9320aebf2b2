use crate::{
    compile_error::CompileError,
    walker::{Node, NodeKind, NodeMut, WalkContext},
};

#[derive(Debug, Clone, PartialEq)]
pub enum VisitAction {
    Continue,
    /// Do not descend into the node's children; `leave` still runs
    SkipChildren,
    /// Abort this node; the walker puts the new node in its place and visits it
    Replace(Node),
}

/// A resolution step applied to every node of the kinds it registers for.
///
/// Visitors are shared between compilations running on different threads, so
/// they keep no per-walk state: whatever has to survive between callbacks is
/// written to the tree or read from the [`WalkContext`].
pub trait Visitor: Send + Sync {
    fn name(&self) -> &'static str;

    fn kinds(&self) -> &'static [NodeKind];

    fn enter(&self, _node: NodeMut<'_>, _ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        Ok(VisitAction::Continue)
    }

    fn leave(&self, _node: NodeMut<'_>, _ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        Ok(VisitAction::Continue)
    }
}
