use std::collections::HashMap;

use tracing::trace;

use crate::{
    compile_error::{CompileError, InternalError},
    parser::ast::Query,
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Depth-first traversal dispatching to the visitors registered for each
/// node kind, in registration order.
pub struct Walker {
    visitors: Vec<Box<dyn Visitor>>,
    by_kind: HashMap<NodeKind, Vec<usize>>,
}

enum Phase {
    Enter,
    Leave,
}

impl Walker {
    pub fn new(visitors: Vec<Box<dyn Visitor>>) -> Self {
        let mut by_kind: HashMap<NodeKind, Vec<usize>> = HashMap::new();
        for (index, visitor) in visitors.iter().enumerate() {
            for kind in visitor.kinds() {
                by_kind.entry(*kind).or_default().push(index);
            }
        }
        Self { visitors, by_kind }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.visitors.iter().map(|v| v.name()).collect()
    }

    pub fn walk(&self, query: &mut Query) -> Result<(), CompileError> {
        let mut ctx = WalkContext::new();
        let root = NodeMut::from(query);
        let kind = root.kind();

        self.walk_node(root, "root", 0, vec![kind], false, &mut ctx)?;

        if !ctx.is_balanced() {
            return Err(InternalError::UnbalancedWalk("stacks not empty after walk".into()).into());
        }
        Ok(())
    }

    fn walk_node(
        &self,
        node: NodeMut<'_>,
        slot: &'static str,
        index: usize,
        siblings: Vec<NodeKind>,
        isolated: bool,
        ctx: &mut WalkContext,
    ) -> Result<(), CompileError> {
        ctx.push_frame(node.kind(), slot, index, siblings);
        self.visit(node, isolated, ctx)?;
        ctx.pop_frame()?;
        Ok(())
    }

    fn visit(&self, mut node: NodeMut<'_>, isolated: bool, ctx: &mut WalkContext) -> Result<(), CompileError> {
        'node: loop {
            let kind = node.kind();
            ctx.set_kind(kind);

            let descend = match self.dispatch(Phase::Enter, kind, node.reborrow(), ctx)? {
                VisitAction::Continue => true,
                VisitAction::SkipChildren => false,
                VisitAction::Replace(replacement) => {
                    trace!(from = %kind, to = %replacement.kind(), "node replaced on enter");
                    node.replace(replacement)?;
                    continue 'node;
                },
            };

            if descend {
                self.walk_children(node.reborrow(), kind, isolated, ctx)?;
            }

            match self.dispatch(Phase::Leave, kind, node.reborrow(), ctx)? {
                VisitAction::Replace(replacement) => {
                    trace!(from = %kind, to = %replacement.kind(), "node replaced on leave");
                    node.replace(replacement)?;
                    continue 'node;
                },
                VisitAction::Continue | VisitAction::SkipChildren => return Ok(()),
            }
        }
    }

    fn walk_children(&self, mut node: NodeMut<'_>, kind: NodeKind, isolated: bool, ctx: &mut WalkContext) -> Result<(), CompileError> {
        let scoped = kind.is_query();
        if scoped {
            let facts = node.facts_mut().map(std::mem::take).unwrap_or_default();
            ctx.push_scope(facts, isolated);
        }

        let walked = self.walk_slots(node.reborrow(), ctx);

        if scoped {
            let facts = ctx.pop_scope()?;
            if let Some(slot) = node.facts_mut() {
                *slot = facts;
            }
        }

        walked
    }

    fn walk_slots(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<(), CompileError> {
        for slot in node.children() {
            let siblings: Vec<NodeKind> = slot.nodes.iter().map(NodeMut::kind).collect();
            for (index, child) in slot.nodes.into_iter().enumerate() {
                self.walk_node(child, slot.name, index, siblings.clone(), slot.isolated, ctx)?;
            }
        }
        Ok(())
    }

    fn dispatch(&self, phase: Phase, kind: NodeKind, mut node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        let Some(indexes) = self.by_kind.get(&kind) else {
            return Ok(VisitAction::Continue);
        };

        let mut outcome = VisitAction::Continue;
        for index in indexes {
            let visitor = &self.visitors[*index];
            let action = match phase {
                Phase::Enter => visitor.enter(node.reborrow(), ctx)?,
                Phase::Leave => visitor.leave(node.reborrow(), ctx)?,
            };

            match action {
                VisitAction::Continue => {},
                VisitAction::SkipChildren => outcome = VisitAction::SkipChildren,
                replace @ VisitAction::Replace(_) => return Ok(replace),
            }
        }

        Ok(outcome)
    }
}
