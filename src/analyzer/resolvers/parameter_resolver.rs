use crate::{
    analyzer::AnalyzerError,
    compile_error::{CompileError, InternalError},
    metadata::FieldType,
    parser::ast::{
        Assignment, BinaryExpression, BinaryOperator, Expression, Insert, InsertSource, ParameterKey,
        ParameterReference, ParameterSlot, ResolvedField,
    },
    walker::{Node, NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Turns named placeholders into anonymous ones, types them from the fields
/// they are compared with, and numbers every placeholder in text order.
pub struct ParameterResolver;

impl ParameterResolver {
    /// Give `target` the type of `field` when it is a still untyped
    /// placeholder, or a list of them (`IN (?, ?)`).
    fn assign(target: &mut Expression, field: &ResolvedField) {
        match target {
            Expression::Parameter(parameter) => {
                parameter.ty.get_or_insert(field.ty);
                parameter.nullable.get_or_insert(field.nullable);
            },
            Expression::NamedParameter(named) => {
                named.ty.get_or_insert(field.ty);
            },
            Expression::List(items) => items.iter_mut().for_each(|item| Self::assign(item, field)),
            _ => {},
        }
    }

    fn resolved(expression: &Expression) -> Option<ResolvedField> {
        expression.underlying_identifier().and_then(|identifier| identifier.resolved()).cloned()
    }

    fn infer_operands<Op: BinaryOperator>(expression: &mut BinaryExpression<Op>) {
        let BinaryExpression { left, right, .. } = expression;
        if let Some(field) = Self::resolved(left) {
            Self::assign(right, &field);
        }
        if let Some(field) = Self::resolved(right) {
            Self::assign(left, &field);
        }
    }

    fn infer_assignment(assignment: &mut Assignment) {
        let Assignment { target, value } = assignment;
        if let Some(field) = Self::resolved(target) {
            Self::assign(value, &field);
        }
    }

    fn infer_insert(insert: &mut Insert) {
        let Insert { columns, source, .. } = insert;
        let InsertSource::Values(rows) = source else {
            return;
        };

        for row in rows.iter_mut() {
            let Expression::List(items) = row else {
                continue;
            };
            for (column, item) in columns.iter().zip(items.iter_mut()) {
                if let Some(field) = Self::resolved(column) {
                    Self::assign(item, &field);
                }
            }
        }
    }

    /// Take a value from the literal bag, then append the slot to the root
    /// query's parameter list.
    fn register(parameter: &mut ParameterReference, ctx: &mut WalkContext) -> Result<(), CompileError> {
        if parameter.id.is_some() {
            return Ok(());
        }

        if parameter.value.is_none() {
            if let Some(literals) = ctx.literals() {
                parameter.value = match (&parameter.replaces, parameter.position) {
                    (Some(name), _) => Some(
                        literals.named.get(name).cloned()
                            .ok_or_else(|| AnalyzerError::UnmatchedNamedParameter(name.clone()))?,
                    ),
                    (None, Some(position)) => literals.positional.get(position).cloned(),
                    (None, None) => None,
                };
            }
        }

        let slot = match &parameter.value {
            Some(value) => ParameterSlot::Fixed {
                value: value.clone(),
                ty: parameter.ty.or_else(|| Some(FieldType::of_value(value))),
            },
            None => {
                let key = match (&parameter.replaces, parameter.position) {
                    (Some(name), _) => ParameterKey::Name(name.clone()),
                    (None, Some(position)) => ParameterKey::Position(position),
                    (None, None) => {
                        return Err(AnalyzerError::QueryConstruction("parameter without name, position or value".into()).into());
                    },
                };
                ParameterSlot::Required { key, ty: parameter.ty }
            },
        };

        let root = ctx.root_scope_mut()
            .ok_or_else(|| InternalError::UnbalancedWalk("parameter outside of a query".into()))?;
        parameter.id = Some(root.register_parameter(slot));
        Ok(())
    }
}

impl Visitor for ParameterResolver {
    fn name(&self) -> &'static str {
        "parameter"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Insert,
            NodeKind::Assignment,
            NodeKind::Arithmetic,
            NodeKind::Binary,
            NodeKind::Logic,
            NodeKind::NamedParameter,
            NodeKind::Parameter,
        ]
    }

    fn enter(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        match node {
            NodeMut::Insert(insert) => Self::infer_insert(insert),
            NodeMut::Assignment(assignment) => Self::infer_assignment(assignment),
            NodeMut::Expression(expression) => match expression {
                Expression::Arithmetic(e) => Self::infer_operands(&mut **e),
                Expression::Binary(e) => Self::infer_operands(&mut **e),
                Expression::Logic(e) => Self::infer_operands(&mut **e),
                Expression::NamedParameter(named) => {
                    let replacement = Expression::Parameter(ParameterReference::replacing(named));
                    return Ok(VisitAction::Replace(Node::Expression(replacement)));
                },
                Expression::Parameter(parameter) => Self::register(parameter, ctx)?,
                _ => {},
            },
            _ => {},
        }
        Ok(VisitAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        analyzer::{AnalyzerError, Pipeline},
        compile_error::CompileError,
        config::Config,
        fixtures,
        metadata::FieldType,
        parser::ast::{Bindings, ParameterKey, ParameterSlot, Query},
    };

    fn resolve(query: Query) -> Result<Query, CompileError> {
        let mut query = query;
        Pipeline::new(fixtures::provider(), &Config::default()).run(&mut query)?;
        Ok(query)
    }

    fn parse(text: &str) -> Query {
        Query::try_from(text).unwrap()
    }

    #[test]
    pub fn test_named_parameters_become_required_slots() {
        let query = resolve(parse("SELECT u.id FROM User u WHERE u.name = :name AND u.id > ?")).unwrap();

        assert_eq!(query.facts().parameters, vec![
            ParameterSlot::Required { key: ParameterKey::Name("name".into()), ty: Some(FieldType::String) },
            ParameterSlot::Required { key: ParameterKey::Position(0), ty: Some(FieldType::Int) },
        ]);
    }

    #[test]
    pub fn test_subquery_parameters_follow_text_order() {
        let query = resolve(parse(
            "SELECT c.id FROM Customer c WHERE c.name = ? AND c.id IN (SELECT o.customerId FROM orders o WHERE o.total > ?) AND c.id < ?"
        )).unwrap();

        let keys: Vec<_> = query.facts().parameters.iter()
            .map(|slot| match slot {
                ParameterSlot::Required { key: ParameterKey::Position(position), ty } => (*position, *ty),
                other => panic!("Unexpected slot {:?}", other),
            })
            .collect();
        assert_eq!(keys, vec![(0, Some(FieldType::String)), (1, Some(FieldType::Float)), (2, Some(FieldType::Int))]);
    }

    #[test]
    pub fn test_repeated_name_gets_one_slot_per_occurrence() {
        let query = resolve(parse("SELECT u.id FROM User u WHERE u.name = :x OR u.email = :x")).unwrap();
        assert_eq!(query.facts().parameters.len(), 2);
    }

    #[test]
    pub fn test_literal_bag_fixes_values() {
        let bindings = Bindings::positional(vec![json!(3)]).with("name", json!("ann"));
        let query = resolve(parse("SELECT u.id FROM User u WHERE u.id = ? AND u.name = :name").with_literals(bindings)).unwrap();

        assert_eq!(query.facts().parameters, vec![
            ParameterSlot::Fixed { value: json!(3), ty: Some(FieldType::Int) },
            ParameterSlot::Fixed { value: json!("ann"), ty: Some(FieldType::String) },
        ]);
    }

    #[test]
    pub fn test_unmatched_name_in_literal_bag() {
        let query = parse("SELECT u.id FROM User u WHERE u.name = :nick").with_literals(Bindings::new());
        assert_eq!(resolve(query).unwrap_err(), CompileError::Query(AnalyzerError::UnmatchedNamedParameter("nick".into())));
    }

    #[test]
    pub fn test_typing_from_assignments_and_insert_columns() {
        let query = resolve(parse("UPDATE User SET email = ? WHERE id = ?")).unwrap();
        let types: Vec<_> = query.facts().parameters.iter().map(ParameterSlot::ty).collect();
        assert_eq!(types, vec![Some(FieldType::String), Some(FieldType::Int)]);

        let query = resolve(parse("INSERT INTO orders (total, status) VALUES (?, ?), (?, 'new')")).unwrap();
        let types: Vec<_> = query.facts().parameters.iter().map(ParameterSlot::ty).collect();
        assert_eq!(types, vec![Some(FieldType::Float), Some(FieldType::String), Some(FieldType::Float)]);
    }

    #[test]
    pub fn test_in_list_parameters_are_typed() {
        let query = resolve(parse("SELECT t.id FROM Tag t WHERE t.label IN (?, ?)")).unwrap();
        let types: Vec<_> = query.facts().parameters.iter().map(ParameterSlot::ty).collect();
        assert_eq!(types, vec![Some(FieldType::String), Some(FieldType::String)]);
    }
}
