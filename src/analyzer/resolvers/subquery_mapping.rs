use indexmap::IndexMap;

use crate::{
    analyzer::{AnalyzerError, FieldLookup, TypeInference},
    compile_error::{CompileError, InternalError},
    metadata::{FieldMeta, FieldType},
    parser::ast::{Resource, ResultField, Select, TableSource},
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Turns a derived table's result fields into the field map of its alias,
/// so the enclosing query can resolve `alias.column`.
pub struct SubqueryMapping;

impl SubqueryMapping {
    /// Output name -> column the database returns for it.
    pub fn derived_fields(select: &Select) -> Result<IndexMap<String, FieldMeta>, AnalyzerError> {
        let scopes = [&select.facts];
        let mut fields = IndexMap::new();

        for field in &select.fields {
            if field.is_wildcard() {
                Self::expand_wildcard(field, select, &mut fields)?;
                continue;
            }

            let (name, meta) = match (&field.alias, field.expression.as_identifier()) {
                (alias, Some(identifier)) => match FieldLookup::find(&identifier.value, scopes)? {
                    Some(found) => {
                        let name = alias.clone().unwrap_or_else(|| identifier.name().to_string());
                        let column = alias.as_deref().unwrap_or(&found.field.column);
                        let meta = FieldMeta { column: column.to_string(), ..found.field.clone() };
                        (name, meta)
                    },
                    None => {
                        let name = alias.clone().unwrap_or_else(|| identifier.name().to_string());
                        (name.clone(), FieldMeta::new(&name, FieldType::String).nullable())
                    },
                },
                (Some(alias), None) => {
                    let (ty, nullable) = TypeInference::infer(&field.expression, &scopes).unwrap_or((FieldType::String, true));
                    let mut meta = FieldMeta::new(alias, ty);
                    meta.nullable = nullable;
                    (alias.clone(), meta)
                },
                (None, None) => {
                    return Err(AnalyzerError::MissingAlias { expression: field.expression.to_string() });
                },
            };

            fields.insert(name, meta);
        }

        Ok(fields)
    }

    fn expand_wildcard(field: &ResultField, select: &Select, fields: &mut IndexMap<String, FieldMeta>) -> Result<(), AnalyzerError> {
        let qualifier = field.expression.as_identifier().and_then(|identifier| identifier.qualifier());
        let resources: Vec<&Resource> = match qualifier {
            Some(qualifier) => vec![
                select.facts.resources.by_qualifier(qualifier)
                    .ok_or_else(|| AnalyzerError::UnknownAlias(qualifier.to_string()))?,
            ],
            None => select.facts.resources.iter().collect(),
        };

        for resource in resources {
            for (property, meta) in resource.fields.iter().flatten() {
                fields.insert(property.clone(), meta.clone());
            }
        }
        Ok(())
    }
}

impl Visitor for SubqueryMapping {
    fn name(&self) -> &'static str {
        "subquery"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Table]
    }

    fn leave(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        let NodeMut::Table(table) = node else {
            return Ok(VisitAction::Continue);
        };
        let TableSource::Subquery(select) = &table.source else {
            return Ok(VisitAction::Continue);
        };

        let alias = table.alias.clone()
            .ok_or_else(|| AnalyzerError::MissingAlias { expression: format!("({})", select) })?;
        let fields = Self::derived_fields(select)?;

        ctx.scope_mut()
            .ok_or_else(|| InternalError::UnbalancedWalk("derived table outside of a query".into()))?
            .resources
            .register(Resource::derived(&alias, fields))?;

        Ok(VisitAction::Continue)
    }
}
