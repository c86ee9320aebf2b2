use crate::{
    compile_error::{CompileError, InternalError},
    parser::ast::{
        ArithmeticOp, BinaryExpression, BinaryOperator, CaseExpression, ComparatorOp, Delete, Expression,
        FunctionCall, Identifier, Insert, InsertSource, Join, Literal, LogicOp, OrderExpression, Query, ResultField,
        Select, TableExpression, TableSource, UnaryOp, Update,
    },
    platform::{Platform, RenderContext},
};

/// Renders a fully resolved query through a platform's spelling rules.
///
/// All recursion state travels in [`RenderContext`] arguments; the renderer
/// itself only borrows the platform.
pub struct SqlRenderer<'a, P: Platform + ?Sized> {
    platform: &'a P,
}

type RenderResult = Result<String, CompileError>;

impl<'a, P: Platform + ?Sized> SqlRenderer<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    pub fn render(&self, query: &Query) -> RenderResult {
        match query {
            Query::Select(select) => self.select(select),
            Query::Insert(insert) => self.insert(insert),
            Query::Update(update) => self.update(update),
            Query::Delete(delete) => self.delete(delete),
        }
    }

    fn list<T>(&self, items: &[T], render: impl Fn(&T) -> RenderResult) -> RenderResult {
        let parts = items.iter().map(render).collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(", "))
    }

    pub fn select(&self, select: &Select) -> RenderResult {
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.list(&select.fields, |f| self.result_field(f))?);

        if let Some(from) = &select.from {
            sql.push_str(&format!(" FROM {}", self.table(from)?));
        }
        for join in &select.joins {
            sql.push_str(&format!(" {}", self.join(join)?));
        }
        if let Some(criteria) = &select.criteria {
            sql.push_str(&format!(" WHERE {}", self.expression(criteria)?));
        }
        if !select.group_by.is_empty() {
            let group_by = self.list(&select.group_by, |e| self.expression(e))?;
            sql.push_str(&format!(" GROUP BY {}", group_by));
        }
        if let Some(having) = &select.having {
            sql.push_str(&format!(" HAVING {}", self.expression(having)?));
        }
        sql.push_str(&self.tail(&select.order_by, &select.limit, &select.offset)?);

        for union in &select.unions {
            let keyword = if union.all { "UNION ALL" } else { "UNION" };
            sql.push_str(&format!(" {} {}", keyword, self.select(&union.select)?));
        }
        Ok(sql)
    }

    pub fn insert(&self, insert: &Insert) -> RenderResult {
        let table = self.table_name(&insert.table)?;
        let mut sql = format!("INSERT INTO {}", table);

        if !insert.columns.is_empty() {
            let columns = self.list(&insert.columns, |column| {
                let identifier = column.as_identifier()
                    .ok_or_else(|| InternalError::UnknownNode(format!("insert column {}", column)))?;
                Ok(self.platform.quote_identifier(identifier.name()))
            })?;
            sql.push_str(&format!(" ({})", columns));
        }

        match &insert.source {
            InsertSource::Values(rows) => {
                let rows = self.list(rows, |row| match row {
                    Expression::List(_) => self.expression(row),
                    other => Err(InternalError::UnknownNode(format!("values row {}", other)).into()),
                })?;
                sql.push_str(&format!(" VALUES {}", rows));
            },
            InsertSource::Select(select) => sql.push_str(&format!(" {}", self.select(select)?)),
        }

        if !insert.returning.is_empty() && self.platform.supports_returning() {
            sql.push_str(&format!(" RETURNING {}", self.list(&insert.returning, |f| self.result_field(f))?));
        }
        Ok(sql)
    }

    pub fn update(&self, update: &Update) -> RenderResult {
        let assignments = self.list(&update.assignments, |assignment| {
            let target = self.expression(&assignment.target)?;
            let value = self.expression(&assignment.value)?;
            Ok(format!("{} = {}", target, value))
        })?;

        let mut sql = format!("UPDATE {} SET {}", self.table(&update.table)?, assignments);
        if let Some(criteria) = &update.criteria {
            sql.push_str(&format!(" WHERE {}", self.expression(criteria)?));
        }
        sql.push_str(&self.tail(&update.order_by, &update.limit, &update.offset)?);
        Ok(sql)
    }

    pub fn delete(&self, delete: &Delete) -> RenderResult {
        let mut sql = format!("DELETE FROM {}", self.table(&delete.table)?);
        if let Some(criteria) = &delete.criteria {
            sql.push_str(&format!(" WHERE {}", self.expression(criteria)?));
        }
        sql.push_str(&self.tail(&delete.order_by, &delete.limit, &delete.offset)?);
        Ok(sql)
    }

    fn tail(&self, order_by: &[OrderExpression], limit: &Option<Expression>, offset: &Option<Expression>) -> RenderResult {
        let mut sql = String::new();
        if !order_by.is_empty() {
            let items = self.list(order_by, |item| {
                let direction = if item.ascending { "ASC" } else { "DESC" };
                Ok(format!("{} {}", self.expression(&item.expression)?, direction))
            })?;
            sql.push_str(&format!(" ORDER BY {}", items));
        }

        let limit = limit.as_ref().map(|e| self.expression(e)).transpose()?;
        let offset = offset.as_ref().map(|e| self.expression(e)).transpose()?;
        if limit.is_some() || offset.is_some() {
            sql.push_str(&self.platform.pagination(limit.as_deref(), offset.as_deref()));
        }
        Ok(sql)
    }

    fn table_name(&self, table: &TableExpression) -> RenderResult {
        match &table.source {
            TableSource::Table(name) => Ok(self.platform.quote_identifier(name)),
            TableSource::Subquery(select) => Err(InternalError::UnknownNode(format!("derived table ({}) as target", select)).into()),
        }
    }

    fn table(&self, table: &TableExpression) -> RenderResult {
        let source = match &table.source {
            TableSource::Table(name) => self.platform.quote_identifier(name),
            TableSource::Subquery(select) => format!("({})", self.select(select)?),
        };
        Ok(match &table.alias {
            Some(alias) => format!("{} {}", source, self.platform.quote_identifier(alias)),
            None => source,
        })
    }

    fn join(&self, join: &Join) -> RenderResult {
        let condition = join.condition.as_ref().ok_or_else(|| {
            InternalError::UnknownNode(format!("join on {} without a condition", join.table))
        })?;
        Ok(format!("{} {} ON {}", join.kind, self.table(&join.table)?, self.expression(condition)?))
    }

    fn result_field(&self, field: &ResultField) -> RenderResult {
        let expression = self.expression(&field.expression)?;
        Ok(match &field.alias {
            Some(alias) => format!("{} AS {}", expression, self.platform.quote_identifier(alias)),
            None => expression,
        })
    }

    fn identifier(&self, identifier: &Identifier) -> String {
        self.platform.quote_identifier(&identifier.value)
    }

    fn literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => self.platform.quote_string(s),
            Literal::Bool(b) => self.platform.bool_literal(*b),
            other => other.to_string(),
        }
    }

    fn operand(&self, expression: &Expression, ctx: RenderContext) -> RenderResult {
        let rendered = self.expression(expression)?;
        if ctx.wraps(expression) {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }

    fn operands<Op: BinaryOperator>(&self, e: &BinaryExpression<Op>, logic: Option<LogicOp>) -> Result<(String, String), CompileError> {
        let level = e.op.precedence();
        let left = self.operand(&e.left, RenderContext::left_of(level, logic))?;
        let right = self.operand(&e.right, RenderContext::right_of(level, logic))?;
        Ok((left, right))
    }

    fn function(&self, function: &FunctionCall) -> RenderResult {
        let name = self.platform.functions()
            .native(&function.name, function.args.len())
            .unwrap_or(function.name.as_str());
        let args = self.list(&function.args, |arg| self.expression(arg))?;

        if function.distinct {
            Ok(format!("{}(DISTINCT {})", name, args))
        } else {
            Ok(format!("{}({})", name, args))
        }
    }

    fn case(&self, case: &CaseExpression) -> RenderResult {
        let mut sql = String::from("CASE");
        if let Some(operand) = &case.operand {
            sql.push_str(&format!(" {}", self.expression(operand)?));
        }
        for branch in &case.branches {
            sql.push_str(&format!(
                " WHEN {} THEN {}",
                self.expression(&branch.when)?,
                self.expression(&branch.then)?,
            ));
        }
        if let Some(otherwise) = &case.otherwise {
            sql.push_str(&format!(" ELSE {}", self.expression(otherwise)?));
        }
        sql.push_str(" END");
        Ok(sql)
    }

    pub fn expression(&self, expression: &Expression) -> RenderResult {
        match expression {
            Expression::Identifier(identifier) => Ok(self.identifier(identifier)),
            Expression::Literal(literal) => Ok(self.literal(literal)),
            Expression::Parameter(parameter) => {
                let id = parameter.id.ok_or(InternalError::UnnumberedParameter)?;
                Ok(self.platform.placeholder(id))
            },
            Expression::NamedParameter(named) => Err(InternalError::UnresolvedNamedParameter(named.name.clone()).into()),
            Expression::Function(function) => self.function(function),
            Expression::List(items) => Ok(format!("({})", self.list(items, |i| self.expression(i))?)),
            Expression::Arithmetic(e) => {
                let (left, right) = self.operands(e, None)?;
                match e.op {
                    ArithmeticOp::Concat => Ok(self.platform.concat(&[left.as_str(), right.as_str()])),
                    op => Ok(format!("{} {} {}", left, op, right)),
                }
            },
            Expression::Binary(e) => {
                let (left, right) = self.operands(e, None)?;
                match e.op {
                    ComparatorOp::Contains => Ok(self.platform.contains(&left, &right)),
                    op => Ok(format!("{} {} {}", left, op, right)),
                }
            },
            Expression::Logic(e) => {
                let (left, right) = self.operands(e, Some(e.op))?;
                Ok(format!("{} {} {}", left, e.op, right))
            },
            Expression::Unary(e) => {
                let operand = self.operand(&e.operand, RenderContext::left_of(e.op.precedence(), None))?;
                match e.op {
                    UnaryOp::Not => Ok(format!("NOT {}", operand)),
                    UnaryOp::Negate if operand.starts_with('-') => Ok(format!("-({})", operand)),
                    UnaryOp::Negate => Ok(format!("-{}", operand)),
                }
            },
            Expression::Case(case) => self.case(case),
            Expression::Subquery(select) => Ok(format!("({})", self.select(select)?)),
        }
    }
}
