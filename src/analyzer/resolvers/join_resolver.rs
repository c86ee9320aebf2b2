use std::sync::Arc;

use crate::{
    analyzer::AnalyzerError,
    compile_error::CompileError,
    metadata::{MetadataProvider, RelationKind},
    parser::ast::{
        ComparatorOp, Expression, Join, LogicOp, QueryFacts, RelationPath, Resource, Select, TableExpression,
    },
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Completes joins written as relation navigation (`JOIN o.customer c`) with
/// the condition their relation metadata implies.
pub struct JoinResolver {
    provider: Arc<dyn MetadataProvider>,
}

fn equals(left_qualifier: &str, left: &str, right_qualifier: &str, right: &str) -> Expression {
    Expression::binary(
        Expression::identifier(&format!("{}.{}", left_qualifier, left)),
        ComparatorOp::Eq,
        Expression::identifier(&format!("{}.{}", right_qualifier, right)),
    )
}

/// Prefix every bare identifier of a relation filter with the join alias.
fn qualify(expression: &mut Expression, alias: &str) {
    match expression {
        Expression::Identifier(identifier) => {
            if identifier.qualifier().is_none() && !identifier.is_wildcard() {
                identifier.value = format!("{}.{}", alias, identifier.value);
            }
        },
        Expression::Function(function) => function.args.iter_mut().for_each(|arg| qualify(arg, alias)),
        Expression::List(items) => items.iter_mut().for_each(|item| qualify(item, alias)),
        Expression::Arithmetic(e) => {
            qualify(&mut e.left, alias);
            qualify(&mut e.right, alias);
        },
        Expression::Binary(e) => {
            qualify(&mut e.left, alias);
            qualify(&mut e.right, alias);
        },
        Expression::Logic(e) => {
            qualify(&mut e.left, alias);
            qualify(&mut e.right, alias);
        },
        Expression::Unary(e) => qualify(&mut e.operand, alias),
        Expression::Case(case) => {
            if let Some(operand) = case.operand.as_mut() {
                qualify(operand, alias);
            }
            for branch in case.branches.iter_mut() {
                qualify(&mut branch.when, alias);
                qualify(&mut branch.then, alias);
            }
            if let Some(otherwise) = case.otherwise.as_mut() {
                qualify(otherwise, alias);
            }
        },
        Expression::Literal(_) | Expression::Parameter(_) | Expression::NamedParameter(_) | Expression::Subquery(_) => {},
    }
}

impl JoinResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    /// Set the condition of `join` and return the junction join that has to
    /// precede it, if the relation goes through a link table.
    fn complete(&self, join: &mut Join, path: &RelationPath, facts: &mut QueryFacts, ctx: &WalkContext) -> Result<Option<Join>, CompileError> {
        let alias = join.table.alias.clone().unwrap_or_else(|| path.relation.clone());
        let incomplete = |reason: String| AnalyzerError::IncompleteJoin { alias: alias.clone(), reason };

        let source = facts.resources.by_qualifier(&path.source)
            .or_else(|| ctx.visible_scopes().find_map(|outer| outer.resources.by_qualifier(&path.source)))
            .ok_or_else(|| AnalyzerError::UnknownAlias(path.source.clone()))?;
        let source_entity = source.entity.clone()
            .ok_or_else(|| incomplete(format!("{} is not a mapped entity", path.source)))?;
        let relation = source_entity.relation(&path.relation).cloned()
            .ok_or_else(|| incomplete(format!("{} has no relation {}", source_entity.name, path.relation)))?;
        let target = self.provider.entity(&relation.target)
            .ok_or_else(|| AnalyzerError::UnknownEntity(relation.target.clone()))?;

        let (mut condition, junction) = match &relation.kind {
            RelationKind::Forward { foreign_key } => {
                let (target_id, _) = target.identifier()?;
                (equals(&alias, target_id, &path.source, foreign_key), None)
            },
            RelationKind::Inverse { foreign_key } => {
                let (source_id, _) = source_entity.identifier()?;
                (equals(&alias, foreign_key, &path.source, source_id), None)
            },
            RelationKind::Junction { table, source_column, target_column } => {
                let (source_id, _) = source_entity.identifier()?;
                let (target_id, _) = target.identifier()?;
                let link = format!("{}_{}", path.source, path.relation);

                facts.resources.register(Resource::raw(Some(&link), table))?;
                let link_join = Join {
                    kind: join.kind,
                    table: TableExpression::table(table, Some(&link)),
                    condition: Some(equals(&link, source_column, &path.source, source_id)),
                    relation: None,
                };
                (equals(&alias, target_id, &link, target_column), Some(link_join))
            },
        };

        if let Some(filter) = &relation.filter {
            let mut restriction = Expression::parse_detached(filter)?;
            qualify(&mut restriction, &alias);
            condition = Expression::logic(condition, LogicOp::And, restriction);
        }

        join.condition = Some(condition);
        Ok(junction)
    }

    fn complete_all(&self, select: &mut Select, ctx: &WalkContext) -> Result<(), CompileError> {
        let joins = std::mem::take(&mut select.joins);
        let mut completed = Vec::with_capacity(joins.len());

        for mut join in joins {
            let pending = match (&join.relation, &join.condition) {
                (Some(path), None) => Some(path.clone()),
                _ => None,
            };
            if let Some(path) = pending {
                if let Some(link) = self.complete(&mut join, &path, &mut select.facts, ctx)? {
                    completed.push(link);
                }
            }
            completed.push(join);
        }

        select.joins = completed;
        Ok(())
    }
}

impl Visitor for JoinResolver {
    fn name(&self) -> &'static str {
        "join"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select]
    }

    fn enter(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        if let NodeMut::Select(select) = node {
            if select.joins.iter().any(|join| join.relation.is_some() && join.condition.is_none()) {
                self.complete_all(select, ctx)?;
            }
        }
        Ok(VisitAction::Continue)
    }
}
