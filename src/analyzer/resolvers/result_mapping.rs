use crate::{
    analyzer::{AnalyzerError, TypeInference},
    compile_error::{CompileError, InternalError},
    metadata::FieldMeta,
    parser::ast::{Expression, Identifier, QueryFacts, ResolvedField, Resource, ResultColumn, ResultField},
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Expands wildcards and records each query's output columns.
pub struct ResultMapping;

impl ResultMapping {
    /// Replace `*` and `alias.*` by one field per mapped property, in place.
    /// Wildcards over raw tables stay as written.
    pub fn expand(fields: Vec<ResultField>, facts: &QueryFacts) -> Result<Vec<ResultField>, AnalyzerError> {
        let mut expanded = Vec::with_capacity(fields.len());

        for field in fields {
            let Some(identifier) = field.expression.as_identifier().filter(|_| field.is_wildcard()) else {
                expanded.push(field);
                continue;
            };

            let (resources, qualify): (Vec<&Resource>, bool) = match identifier.qualifier() {
                Some(qualifier) => {
                    let resource = facts.resources.by_qualifier(qualifier)
                        .ok_or_else(|| AnalyzerError::UnknownAlias(qualifier.to_string()))?;
                    (vec![resource], true)
                },
                None => (facts.resources.iter().collect(), facts.resources.len() > 1),
            };

            if resources.iter().any(|resource| resource.is_raw()) {
                expanded.push(field);
                continue;
            }

            for resource in resources {
                for (property, meta) in resource.fields.iter().flatten() {
                    Self::push_property(&mut expanded, resource, property, meta, qualify);
                }
            }
        }

        Ok(expanded)
    }

    /// Embedded properties contribute one field per sub-property.
    fn push_property(fields: &mut Vec<ResultField>, resource: &Resource, property: &str, meta: &FieldMeta, qualify: bool) {
        if meta.has_subfields() {
            for (sub, submeta) in &meta.subfields {
                Self::push_property(fields, resource, &format!("{}.{}", property, sub), submeta, qualify);
            }
            return;
        }

        let value = match qualify {
            true => format!("{}.{}", resource.qualifier(), meta.column),
            false => meta.column.clone(),
        };
        let mut identifier = Identifier::new(value);
        identifier.resolve(ResolvedField {
            ty: meta.ty,
            nullable: meta.nullable,
            entity: resource.entity.as_ref().map(|entity| entity.name.clone()),
            property: Some(property.to_string()),
        });
        fields.push(ResultField::new(Expression::Identifier(identifier), None));
    }

    /// Output name and returned column label of a result field.
    fn names(field: &ResultField) -> Result<(String, String), AnalyzerError> {
        if let Some(alias) = &field.alias {
            return Ok((alias.clone(), alias.clone()));
        }

        let identifier = field.expression.underlying_identifier()
            .ok_or_else(|| AnalyzerError::MissingAlias { expression: field.expression.to_string() })?;
        let name = identifier.resolved()
            .and_then(|resolved| resolved.property.clone())
            .unwrap_or_else(|| identifier.name().to_string());

        Ok((name, identifier.name().to_string()))
    }

    fn column(field: &ResultField, column: String, ctx: &WalkContext) -> ResultColumn {
        let scopes: Vec<&QueryFacts> = ctx.visible_scopes().collect();
        let (ty, nullable) = match TypeInference::infer(&field.expression, &scopes) {
            Some((ty, nullable)) => (Some(ty), nullable),
            None => (None, true),
        };
        let source = field.expression.underlying_identifier()
            .and_then(Identifier::resolved)
            .and_then(|resolved| Some(format!("{}.{}", resolved.entity.as_ref()?, resolved.property.as_ref()?)));

        ResultColumn { column, ty, nullable, source }
    }
}

impl Visitor for ResultMapping {
    fn name(&self) -> &'static str {
        "result"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Select, NodeKind::Insert, NodeKind::ResultField]
    }

    fn enter(&self, node: NodeMut<'_>, _ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        match node {
            NodeMut::Select(select) => {
                let fields = std::mem::take(&mut select.fields);
                select.fields = Self::expand(fields, &select.facts)?;
            },
            NodeMut::Insert(insert) => {
                let fields = std::mem::take(&mut insert.returning);
                insert.returning = Self::expand(fields, &insert.facts)?;
            },
            _ => {},
        }
        Ok(VisitAction::Continue)
    }

    fn leave(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        let NodeMut::ResultField(field) = node else {
            return Ok(VisitAction::Continue);
        };
        if field.is_wildcard() {
            return Ok(VisitAction::Continue);
        }

        let (name, column) = Self::names(field)?;
        let column = Self::column(field, column, ctx);

        ctx.scope_mut()
            .ok_or_else(|| InternalError::UnbalancedWalk("result field outside of a query".into()))?
            .register_result(&name, column)?;

        Ok(VisitAction::Continue)
    }
}
