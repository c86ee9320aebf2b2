use std::sync::Arc;

use tracing::warn;

use crate::{
    analyzer::AnalyzerError,
    compile_error::{CompileError, InternalError},
    metadata::MetadataProvider,
    parser::ast::{RelationPath, Resource, TableExpression, TableSource},
    walker::{NodeKind, NodeMut, VisitAction, Visitor, WalkContext},
};

/// Maps table references to entities and registers them as resources of the
/// owning query.
pub struct EntityResolver {
    provider: Arc<dyn MetadataProvider>,
    strict_tables: bool,
}

impl EntityResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, strict_tables: bool) -> Self {
        Self { provider, strict_tables }
    }

    /// `JOIN o.customer c`: the target entity of relation `customer` on the
    /// resource aliased `o`. The alias defaults to the relation name.
    fn navigate(&self, table: &mut TableExpression, path: &RelationPath, ctx: &WalkContext) -> Result<Resource, AnalyzerError> {
        if ctx.parent() != Some(NodeKind::Join) {
            return Err(AnalyzerError::QueryConstruction(format!(
                "relation path {}.{} can only be joined", path.source, path.relation
            )));
        }

        let source = ctx.visible_scopes()
            .find_map(|facts| facts.resources.by_qualifier(&path.source))
            .ok_or_else(|| AnalyzerError::UnknownAlias(path.source.clone()))?;

        let unknown = || AnalyzerError::UnknownRelation { entity: source.name.clone(), relation: path.relation.clone() };
        let entity = source.entity.as_ref().ok_or_else(unknown)?;
        let relation = entity.relation(&path.relation).ok_or_else(unknown)?;
        let target = self.provider.entity(&relation.target)
            .ok_or_else(|| AnalyzerError::UnknownEntity(relation.target.clone()))?;

        let alias = table.alias.get_or_insert_with(|| path.relation.clone()).clone();
        table.source = TableSource::Table(target.table.clone());

        Ok(Resource::mapped(Some(&alias), target))
    }

    fn map(&self, table: &mut TableExpression, name: &str) -> Result<Resource, AnalyzerError> {
        if let Some(entity) = self.provider.entity(name) {
            table.source = TableSource::Table(entity.table.clone());
            return Ok(Resource::mapped(table.alias.as_deref(), entity));
        }

        if self.strict_tables {
            return Err(AnalyzerError::UnknownTable(name.to_string()));
        }

        warn!(table = name, "table matches no entity, passing it through unmapped");
        Ok(Resource::raw(table.alias.as_deref(), name))
    }
}

impl Visitor for EntityResolver {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::Table]
    }

    fn enter(&self, node: NodeMut<'_>, ctx: &mut WalkContext) -> Result<VisitAction, CompileError> {
        let NodeMut::Table(table) = node else {
            return Ok(VisitAction::Continue);
        };

        // Derived tables are mapped once their select has been walked.
        let name = match &table.source {
            TableSource::Table(name) => name.clone(),
            TableSource::Subquery(_) => return Ok(VisitAction::Continue),
        };

        let resource = match RelationPath::split(&name) {
            Some(path) => self.navigate(table, &path, ctx)?,
            None => self.map(table, &name)?,
        };

        ctx.scope_mut()
            .ok_or_else(|| InternalError::UnbalancedWalk("table outside of a query".into()))?
            .resources
            .register(resource)?;

        Ok(VisitAction::Continue)
    }
}
