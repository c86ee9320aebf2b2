use serde_json::{Map, Value};

use crate::{
    analyzer::AnalyzerError,
    builder::{AstBuilder, Conditions},
    compile_error::CompileError,
    parser::ast::{
        Bindings, Delete, Expression, Insert, InsertSource, Join, JoinKind, LogicOp, OrderExpression, Query,
        RelationPath, ResultField, Select, TableExpression, Update,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
struct PendingJoin {
    kind: JoinKind,
    target: String,
    alias: Option<String>,
    condition: Option<String>,
}

/// A constructed query together with the values of its positional
/// parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub query: Query,
    pub arguments: Vec<Value>,
}

impl BuiltQuery {
    pub fn bindings(&self) -> Bindings {
        Bindings::positional(self.arguments.clone())
    }
}

/// Fluent construction of the four statement kinds over an entity, without
/// going through query text.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    statement: Statement,
    entity: String,
    alias: Option<String>,
    distinct: bool,
    fields: Vec<String>,
    joins: Vec<PendingJoin>,
    filters: Vec<Conditions>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    rows: Vec<Map<String, Value>>,
    assignments: Map<String, Value>,
    returning: Vec<String>,
}

impl QueryBuilder {
    fn new(statement: Statement, entity: &str) -> Self {
        Self {
            statement,
            entity: entity.to_string(),
            alias: None,
            distinct: false,
            fields: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            rows: Vec::new(),
            assignments: Map::new(),
            returning: Vec::new(),
        }
    }

    pub fn select(entity: &str) -> Self {
        Self::new(Statement::Select, entity)
    }

    pub fn insert(entity: &str) -> Self {
        Self::new(Statement::Insert, entity)
    }

    pub fn update(entity: &str) -> Self {
        Self::new(Statement::Update, entity)
    }

    pub fn delete(entity: &str) -> Self {
        Self::new(Statement::Delete, entity)
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Result fields in query syntax; defaults to every property.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    /// Inner join along a relation (`c.orders`); the condition comes from
    /// the relation metadata.
    pub fn join(self, path: &str, alias: Option<&str>) -> Self {
        self.push_join(JoinKind::Inner, path, alias, None)
    }

    pub fn left_join(self, path: &str, alias: Option<&str>) -> Self {
        self.push_join(JoinKind::Left, path, alias, None)
    }

    /// Join with an explicit condition written in query syntax. Values go
    /// through named parameters (`:min`); `?` is refused at build time.
    pub fn join_on(self, kind: JoinKind, target: &str, alias: &str, condition: &str) -> Self {
        self.push_join(kind, target, Some(alias), Some(condition))
    }

    fn push_join(mut self, kind: JoinKind, target: &str, alias: Option<&str>, condition: Option<&str>) -> Self {
        self.joins.push(PendingJoin {
            kind,
            target: target.to_string(),
            alias: alias.map(str::to_string),
            condition: condition.map(str::to_string),
        });
        self
    }

    /// Restrict the statement; repeated calls are ANDed.
    pub fn filter(mut self, conditions: Conditions) -> Self {
        self.filters.push(conditions);
        self
    }

    pub fn order_by(mut self, order: &str) -> Self {
        self.order_by.push(order.to_string());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn values(mut self, row: Map<String, Value>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn set(mut self, property: &str, value: Value) -> Self {
        self.assignments.insert(property.to_string(), value);
        self
    }

    pub fn returning(mut self, fields: &[&str]) -> Self {
        self.returning.extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn build(self) -> Result<BuiltQuery, CompileError> {
        let mut ast = AstBuilder::new();
        let table = TableExpression::table(&self.entity, self.alias.as_deref());

        let query = match self.statement {
            Statement::Select => Query::Select(Box::new(self.build_select(table, &mut ast)?)),
            Statement::Insert => Query::Insert(Box::new(self.build_insert(table, &mut ast)?)),
            Statement::Update => Query::Update(Box::new(self.build_update(table, &mut ast)?)),
            Statement::Delete => Query::Delete(Box::new(self.build_delete(table, &mut ast)?)),
        };

        Ok(BuiltQuery { query, arguments: ast.into_arguments() })
    }

    fn refs(items: &[String]) -> Vec<&str> {
        items.iter().map(String::as_str).collect()
    }

    fn wildcard(&self) -> ResultField {
        let value = match &self.alias {
            Some(alias) => format!("{}.*", alias),
            None => "*".to_string(),
        };
        ResultField::new(Expression::identifier(&value), None)
    }

    fn criteria(&self, ast: &mut AstBuilder) -> Result<Option<Expression>, AnalyzerError> {
        let mut parts = Vec::new();
        for conditions in &self.filters {
            if let Some(expression) = ast.conditions(conditions)? {
                parts.push(expression);
            }
        }
        Ok(Expression::join_all(parts, LogicOp::And))
    }

    fn tail(&self) -> Result<Tail, CompileError> {
        let order_by = self.order_by.iter()
            .map(|text| AstBuilder::order(text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tail { order_by, limit: self.limit.map(AstBuilder::limit), offset: self.offset.map(AstBuilder::limit) })
    }

    fn build_joins(&self) -> Result<Vec<Join>, CompileError> {
        let mut joins = Vec::with_capacity(self.joins.len());
        for pending in &self.joins {
            let table = TableExpression::table(&pending.target, pending.alias.as_deref());
            let condition = pending.condition.as_deref().map(Expression::parse_detached).transpose()?;
            let relation = if condition.is_some() {
                None
            } else {
                let path = RelationPath::split(&pending.target).ok_or_else(|| {
                    AnalyzerError::QueryConstruction(format!("join on {} needs a relation path or a condition", pending.target))
                })?;
                Some(path)
            };
            joins.push(Join { kind: pending.kind, table, condition, relation });
        }
        Ok(joins)
    }

    fn reject(&self, present: bool, what: &str) -> Result<(), AnalyzerError> {
        if present {
            let statement = format!("{:?}", self.statement).to_uppercase();
            return Err(AnalyzerError::QueryConstruction(format!("{} does not take {}", statement, what)));
        }
        Ok(())
    }

    fn build_select(&self, table: TableExpression, ast: &mut AstBuilder) -> Result<Select, CompileError> {
        self.reject(!self.rows.is_empty() || !self.assignments.is_empty(), "values")?;

        let mut select = Select::from_table(table);
        select.distinct = self.distinct;
        select.fields = if self.fields.is_empty() {
            vec![self.wildcard()]
        } else {
            AstBuilder::result_fields(&Self::refs(&self.fields))?
        };
        select.joins = self.build_joins()?;
        select.criteria = self.criteria(ast)?;

        let tail = self.tail()?;
        select.order_by = tail.order_by;
        select.limit = tail.limit;
        select.offset = tail.offset;
        Ok(select)
    }

    fn build_insert(&self, table: TableExpression, ast: &mut AstBuilder) -> Result<Insert, CompileError> {
        self.reject(!self.filters.is_empty() || !self.joins.is_empty(), "conditions or joins")?;
        self.reject(!self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some(), "ORDER BY, LIMIT or OFFSET")?;

        let Some(first) = self.rows.first() else {
            return Err(AnalyzerError::QueryConstruction("INSERT needs at least one row".into()).into());
        };
        let columns: Vec<String> = first.keys().cloned().collect();

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            rows.push(ast.values_row(&columns, row)?);
        }

        let targets = columns.iter().map(|column| Expression::identifier(column)).collect();
        let mut insert = Insert::new(table, targets, InsertSource::Values(rows));
        insert.returning = AstBuilder::result_fields(&Self::refs(&self.returning))?;
        Ok(insert)
    }

    fn build_update(&self, table: TableExpression, ast: &mut AstBuilder) -> Result<Update, CompileError> {
        self.reject(!self.rows.is_empty() || !self.returning.is_empty(), "rows or RETURNING")?;
        if self.assignments.is_empty() {
            return Err(AnalyzerError::QueryConstruction("UPDATE needs at least one assignment".into()).into());
        }

        let mut update = Update::new(table);
        update.assignments = ast.assignments(&self.assignments);
        update.criteria = self.criteria(ast)?;

        let tail = self.tail()?;
        update.order_by = tail.order_by;
        update.limit = tail.limit;
        update.offset = tail.offset;
        Ok(update)
    }

    fn build_delete(&self, table: TableExpression, ast: &mut AstBuilder) -> Result<Delete, CompileError> {
        self.reject(!self.rows.is_empty() || !self.assignments.is_empty(), "values")?;

        let mut delete = Delete::new(table);
        delete.criteria = self.criteria(ast)?;

        let tail = self.tail()?;
        delete.order_by = tail.order_by;
        delete.limit = tail.limit;
        delete.offset = tail.offset;
        Ok(delete)
    }
}

struct Tail {
    order_by: Vec<OrderExpression>,
    limit: Option<Expression>,
    offset: Option<Expression>,
}
