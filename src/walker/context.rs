use crate::{
    compile_error::InternalError,
    parser::ast::{Bindings, QueryFacts},
    walker::NodeKind,
};

#[derive(Debug, Clone)]
struct Frame {
    kind: NodeKind,
    slot: &'static str,
    index: usize,
    /// Kinds of every node in the same slot, this one included
    siblings: Vec<NodeKind>,
}

#[derive(Debug)]
struct Scope {
    facts: QueryFacts,
    isolated: bool,
}

/// Position of the walker in the tree, plus the facts of every query
/// currently being walked.
///
/// While a query's children are visited its facts live here rather than on
/// the query node, so visitors of inner nodes can read and extend them. At
/// `enter`/`leave` of the query node itself they are back on the node.
#[derive(Debug, Default)]
pub struct WalkContext {
    frames: Vec<Frame>,
    scopes: Vec<Scope>,
}

impl WalkContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_frame(&mut self, kind: NodeKind, slot: &'static str, index: usize, siblings: Vec<NodeKind>) {
        self.frames.push(Frame { kind, slot, index, siblings });
    }

    pub(crate) fn pop_frame(&mut self) -> Result<NodeKind, InternalError> {
        self.frames.pop()
            .map(|frame| frame.kind)
            .ok_or_else(|| InternalError::UnbalancedWalk("frame stack empty".into()))
    }

    /// Record that the current node was replaced by one of another kind.
    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        if let Some(frame) = self.frames.last_mut() {
            frame.kind = kind;
            if let Some(sibling) = frame.siblings.get_mut(frame.index) {
                *sibling = kind;
            }
        }
    }

    pub(crate) fn push_scope(&mut self, facts: QueryFacts, isolated: bool) {
        self.scopes.push(Scope { facts, isolated });
    }

    pub(crate) fn pop_scope(&mut self) -> Result<QueryFacts, InternalError> {
        self.scopes.pop()
            .map(|scope| scope.facts)
            .ok_or_else(|| InternalError::UnbalancedWalk("scope stack empty".into()))
    }

    pub(crate) fn is_balanced(&self) -> bool {
        self.frames.is_empty() && self.scopes.is_empty()
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    /// Name of the parent slot holding the current node.
    pub fn slot(&self) -> Option<&'static str> {
        self.frames.last().map(|frame| frame.slot)
    }

    /// Zero at the root.
    pub fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn root(&self) -> Option<NodeKind> {
        self.frames.first().map(|frame| frame.kind)
    }

    pub fn parent(&self) -> Option<NodeKind> {
        self.frames.iter().rev().nth(1).map(|frame| frame.kind)
    }

    pub fn previous_sibling(&self) -> Option<NodeKind> {
        let frame = self.frames.last()?;
        let index = frame.index.checked_sub(1)?;
        frame.siblings.get(index).copied()
    }

    pub fn next_sibling(&self) -> Option<NodeKind> {
        let frame = self.frames.last()?;
        frame.siblings.get(frame.index + 1).copied()
    }

    /// Slot of the innermost query under which the current node sits
    /// (`order_by` for any node inside an ORDER BY item).
    pub fn query_slot(&self) -> Option<&'static str> {
        self.frames.windows(2).rev()
            .find(|pair| pair[0].kind.is_query())
            .map(|pair| pair[1].slot)
    }

    /// Closest ancestor (current node excluded) of one of `kinds`.
    pub fn nearest_ancestor(&self, kinds: &[NodeKind]) -> Option<NodeKind> {
        self.ancestors(kinds).into_iter().next()
    }

    /// All ancestors of one of `kinds`, innermost first.
    pub fn ancestors(&self, kinds: &[NodeKind]) -> Vec<NodeKind> {
        self.frames.iter().rev().skip(1)
            .map(|frame| frame.kind)
            .filter(|kind| kinds.contains(kind))
            .collect()
    }

    /// Facts of the innermost query whose children are being walked.
    pub fn scope(&self) -> Option<&QueryFacts> {
        self.scopes.last().map(|scope| &scope.facts)
    }

    pub fn scope_mut(&mut self) -> Option<&mut QueryFacts> {
        self.scopes.last_mut().map(|scope| &mut scope.facts)
    }

    /// Facts of the outermost query.
    pub fn root_scope_mut(&mut self) -> Option<&mut QueryFacts> {
        self.scopes.first_mut().map(|scope| &mut scope.facts)
    }

    /// Scopes whose resources the current node may reference, innermost
    /// first. The walk outwards stops at an isolated query (derived table,
    /// union member, insert source).
    pub fn visible_scopes(&self) -> impl Iterator<Item = &QueryFacts> {
        let mut stop = false;
        self.scopes.iter().rev()
            .take_while(move |scope| {
                if stop {
                    return false;
                }
                stop = scope.isolated;
                true
            })
            .map(|scope| &scope.facts)
    }

    /// Literal bag of the nearest enclosing query that carries one.
    pub fn literals(&self) -> Option<&Bindings> {
        self.scopes.iter().rev().find_map(|scope| scope.facts.literals.as_ref())
    }
}
