use std::fmt;

use crate::{
    compile_error::InternalError,
    parser::ast::{
        Assignment, BinaryExpression, BinaryOperator, CaseBranch, CaseExpression, Delete, Expression, Insert, InsertSource, Join,
        OrderExpression, Query, QueryFacts, ResultField, Select, TableExpression, TableSource, UnaryExpression, Update,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Select,
    Insert,
    Update,
    Delete,
    Table,
    Join,
    ResultField,
    Order,
    Assignment,
    CaseBranch,
    Identifier,
    Literal,
    Parameter,
    NamedParameter,
    Function,
    List,
    Arithmetic,
    Binary,
    Logic,
    Unary,
    Case,
    Subquery,
}

impl NodeKind {
    pub fn is_query(&self) -> bool {
        matches!(self, NodeKind::Select | NodeKind::Insert | NodeKind::Update | NodeKind::Delete)
    }

    pub fn of_expression(expression: &Expression) -> NodeKind {
        match expression {
            Expression::Identifier(_) => NodeKind::Identifier,
            Expression::Literal(_) => NodeKind::Literal,
            Expression::Parameter(_) => NodeKind::Parameter,
            Expression::NamedParameter(_) => NodeKind::NamedParameter,
            Expression::Function(_) => NodeKind::Function,
            Expression::List(_) => NodeKind::List,
            Expression::Arithmetic(_) => NodeKind::Arithmetic,
            Expression::Binary(_) => NodeKind::Binary,
            Expression::Logic(_) => NodeKind::Logic,
            Expression::Unary(_) => NodeKind::Unary,
            Expression::Case(_) => NodeKind::Case,
            Expression::Subquery(_) => NodeKind::Subquery,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Owned node handed back by a visitor to take the place of the current one.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expression(Expression),
    Table(TableExpression),
    Join(Join),
    ResultField(ResultField),
    Order(OrderExpression),
    Assignment(Assignment),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Expression(expression) => NodeKind::of_expression(expression),
            Node::Table(_) => NodeKind::Table,
            Node::Join(_) => NodeKind::Join,
            Node::ResultField(_) => NodeKind::ResultField,
            Node::Order(_) => NodeKind::Order,
            Node::Assignment(_) => NodeKind::Assignment,
        }
    }
}

/// Mutable handle on one node of the tree.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Select(&'a mut Select),
    Insert(&'a mut Insert),
    Update(&'a mut Update),
    Delete(&'a mut Delete),
    Table(&'a mut TableExpression),
    Join(&'a mut Join),
    ResultField(&'a mut ResultField),
    Order(&'a mut OrderExpression),
    Assignment(&'a mut Assignment),
    CaseBranch(&'a mut CaseBranch),
    Expression(&'a mut Expression),
}

/// One named child position of a node, in source order.
pub struct Slot<'a> {
    pub name: &'static str,
    pub nodes: Vec<NodeMut<'a>>,
    /// Queries below this slot do not see the enclosing query's resources
    pub isolated: bool,
}

impl<'a> Slot<'a> {
    fn list(name: &'static str, nodes: Vec<NodeMut<'a>>) -> Self {
        Self { name, nodes, isolated: false }
    }

    fn one(name: &'static str, node: NodeMut<'a>) -> Self {
        Self::list(name, vec![node])
    }

    fn optional(name: &'static str, node: Option<NodeMut<'a>>) -> Self {
        Self::list(name, node.into_iter().collect())
    }

    fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }
}

fn expressions<'a>(items: &'a mut [Expression]) -> Vec<NodeMut<'a>> {
    items.iter_mut().map(NodeMut::Expression).collect()
}

fn binary_children<'a, Op: BinaryOperator>(e: &'a mut BinaryExpression<Op>) -> Vec<Slot<'a>> {
    let BinaryExpression { left, right, .. } = e;
    vec![
        Slot::one("left", NodeMut::Expression(left)),
        Slot::one("right", NodeMut::Expression(right)),
    ]
}

impl<'a> From<&'a mut Query> for NodeMut<'a> {
    fn from(query: &'a mut Query) -> Self {
        match query {
            Query::Select(select) => NodeMut::Select(&mut **select),
            Query::Insert(insert) => NodeMut::Insert(&mut **insert),
            Query::Update(update) => NodeMut::Update(&mut **update),
            Query::Delete(delete) => NodeMut::Delete(&mut **delete),
        }
    }
}

impl<'a> NodeMut<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeMut::Select(_) => NodeKind::Select,
            NodeMut::Insert(_) => NodeKind::Insert,
            NodeMut::Update(_) => NodeKind::Update,
            NodeMut::Delete(_) => NodeKind::Delete,
            NodeMut::Table(_) => NodeKind::Table,
            NodeMut::Join(_) => NodeKind::Join,
            NodeMut::ResultField(_) => NodeKind::ResultField,
            NodeMut::Order(_) => NodeKind::Order,
            NodeMut::Assignment(_) => NodeKind::Assignment,
            NodeMut::CaseBranch(_) => NodeKind::CaseBranch,
            NodeMut::Expression(expression) => NodeKind::of_expression(expression),
        }
    }

    /// Shorter-lived handle on the same node.
    pub fn reborrow(&mut self) -> NodeMut<'_> {
        match self {
            NodeMut::Select(n) => NodeMut::Select(&mut **n),
            NodeMut::Insert(n) => NodeMut::Insert(&mut **n),
            NodeMut::Update(n) => NodeMut::Update(&mut **n),
            NodeMut::Delete(n) => NodeMut::Delete(&mut **n),
            NodeMut::Table(n) => NodeMut::Table(&mut **n),
            NodeMut::Join(n) => NodeMut::Join(&mut **n),
            NodeMut::ResultField(n) => NodeMut::ResultField(&mut **n),
            NodeMut::Order(n) => NodeMut::Order(&mut **n),
            NodeMut::Assignment(n) => NodeMut::Assignment(&mut **n),
            NodeMut::CaseBranch(n) => NodeMut::CaseBranch(&mut **n),
            NodeMut::Expression(n) => NodeMut::Expression(&mut **n),
        }
    }

    pub fn facts_mut(&mut self) -> Option<&mut QueryFacts> {
        match self {
            NodeMut::Select(select) => Some(&mut select.facts),
            NodeMut::Insert(insert) => Some(&mut insert.facts),
            NodeMut::Update(update) => Some(&mut update.facts),
            NodeMut::Delete(delete) => Some(&mut delete.facts),
            _ => None,
        }
    }

    /// Put `node` in place of this one. Only nodes of the same category fit.
    pub fn replace(&mut self, node: Node) -> Result<(), InternalError> {
        match (self, node) {
            (NodeMut::Expression(slot), Node::Expression(expression)) => **slot = expression,
            (NodeMut::Table(slot), Node::Table(table)) => **slot = table,
            (NodeMut::Join(slot), Node::Join(join)) => **slot = join,
            (NodeMut::ResultField(slot), Node::ResultField(field)) => **slot = field,
            (NodeMut::Order(slot), Node::Order(order)) => **slot = order,
            (NodeMut::Assignment(slot), Node::Assignment(assignment)) => **slot = assignment,
            (slot, node) => {
                return Err(InternalError::MismatchedReplacement {
                    slot: slot.kind().to_string(),
                    replacement: node.kind().to_string(),
                });
            },
        }
        Ok(())
    }

    /// Child slots in the order their text appears in the query.
    pub fn children(self) -> Vec<Slot<'a>> {
        match self {
            NodeMut::Select(select) => {
                let Select { fields, from, joins, criteria, group_by, having, order_by, limit, offset, unions, .. } = select;
                vec![
                    Slot::list("fields", fields.iter_mut().map(NodeMut::ResultField).collect()),
                    Slot::optional("from", from.as_mut().map(NodeMut::Table)),
                    Slot::list("joins", joins.iter_mut().map(NodeMut::Join).collect()),
                    Slot::optional("criteria", criteria.as_mut().map(NodeMut::Expression)),
                    Slot::list("group_by", expressions(group_by)),
                    Slot::optional("having", having.as_mut().map(NodeMut::Expression)),
                    Slot::list("order_by", order_by.iter_mut().map(NodeMut::Order).collect()),
                    Slot::optional("limit", limit.as_mut().map(NodeMut::Expression)),
                    Slot::optional("offset", offset.as_mut().map(NodeMut::Expression)),
                    Slot::list("unions", unions.iter_mut().map(|u| NodeMut::Select(&mut u.select)).collect()).isolated(),
                ]
            },
            NodeMut::Insert(insert) => {
                let Insert { table, columns, source, returning, .. } = insert;
                let source = match source {
                    InsertSource::Values(rows) => Slot::list("values", expressions(rows)),
                    InsertSource::Select(select) => Slot::one("select", NodeMut::Select(&mut **select)).isolated(),
                };
                vec![
                    Slot::one("table", NodeMut::Table(table)),
                    Slot::list("columns", expressions(columns)),
                    source,
                    Slot::list("returning", returning.iter_mut().map(NodeMut::ResultField).collect()),
                ]
            },
            NodeMut::Update(update) => {
                let Update { table, assignments, criteria, order_by, limit, offset, .. } = update;
                vec![
                    Slot::one("table", NodeMut::Table(table)),
                    Slot::list("assignments", assignments.iter_mut().map(NodeMut::Assignment).collect()),
                    Slot::optional("criteria", criteria.as_mut().map(NodeMut::Expression)),
                    Slot::list("order_by", order_by.iter_mut().map(NodeMut::Order).collect()),
                    Slot::optional("limit", limit.as_mut().map(NodeMut::Expression)),
                    Slot::optional("offset", offset.as_mut().map(NodeMut::Expression)),
                ]
            },
            NodeMut::Delete(delete) => {
                let Delete { table, criteria, order_by, limit, offset, .. } = delete;
                vec![
                    Slot::one("table", NodeMut::Table(table)),
                    Slot::optional("criteria", criteria.as_mut().map(NodeMut::Expression)),
                    Slot::list("order_by", order_by.iter_mut().map(NodeMut::Order).collect()),
                    Slot::optional("limit", limit.as_mut().map(NodeMut::Expression)),
                    Slot::optional("offset", offset.as_mut().map(NodeMut::Expression)),
                ]
            },
            NodeMut::Table(table) => match &mut table.source {
                TableSource::Table(_) => Vec::new(),
                TableSource::Subquery(select) => vec![Slot::one("source", NodeMut::Select(&mut **select)).isolated()],
            },
            NodeMut::Join(join) => {
                let Join { table, condition, .. } = join;
                vec![
                    Slot::one("table", NodeMut::Table(table)),
                    Slot::optional("condition", condition.as_mut().map(NodeMut::Expression)),
                ]
            },
            NodeMut::ResultField(field) => vec![Slot::one("expression", NodeMut::Expression(&mut field.expression))],
            NodeMut::Order(order) => vec![Slot::one("expression", NodeMut::Expression(&mut order.expression))],
            NodeMut::Assignment(assignment) => {
                let Assignment { target, value } = assignment;
                vec![
                    Slot::one("target", NodeMut::Expression(target)),
                    Slot::one("value", NodeMut::Expression(value)),
                ]
            },
            NodeMut::CaseBranch(branch) => {
                let CaseBranch { when, then } = branch;
                vec![
                    Slot::one("when", NodeMut::Expression(when)),
                    Slot::one("then", NodeMut::Expression(then)),
                ]
            },
            NodeMut::Expression(expression) => match expression {
                Expression::Function(function) => vec![Slot::list("args", expressions(&mut function.args))],
                Expression::List(items) => vec![Slot::list("items", expressions(items))],
                Expression::Arithmetic(e) => binary_children(&mut **e),
                Expression::Binary(e) => binary_children(&mut **e),
                Expression::Logic(e) => binary_children(&mut **e),
                Expression::Unary(e) => {
                    let UnaryExpression { operand, .. } = &mut **e;
                    vec![Slot::one("operand", NodeMut::Expression(operand))]
                },
                Expression::Case(case) => {
                    let CaseExpression { operand, branches, otherwise } = &mut **case;
                    vec![
                        Slot::optional("operand", operand.as_mut().map(NodeMut::Expression)),
                        Slot::list("branches", branches.iter_mut().map(NodeMut::CaseBranch).collect()),
                        Slot::optional("otherwise", otherwise.as_mut().map(NodeMut::Expression)),
                    ]
                },
                Expression::Subquery(select) => vec![Slot::one("select", NodeMut::Select(&mut **select))],
                Expression::Identifier(_) | Expression::Literal(_) | Expression::Parameter(_)
                | Expression::NamedParameter(_) => Vec::new(),
            },
        }
    }
}
