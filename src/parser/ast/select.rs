use std::fmt;

use crate::parser::{
    ast::{Expression, Join, OrderExpression, QueryFacts, ResultField, TableExpression},
    ParseError, QueryParser, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub all: bool,
    pub select: Select,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub fields: Vec<ResultField>,
    pub from: Option<TableExpression>,
    pub joins: Vec<Join>,
    pub criteria: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderExpression>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
    pub unions: Vec<Union>,
    pub facts: QueryFacts,
}

impl Select {
    pub fn from_table(table: TableExpression) -> Self {
        Self { from: Some(table), ..Default::default() }
    }

    pub fn parse(parser: &mut QueryParser) -> Result<Select, ParseError> {
        let mut select = Self::parse_core(parser)?;

        loop {
            let all = if COMPARERS.union_all.consume(parser) {
                true
            } else if COMPARERS.union.consume(parser) {
                false
            } else {
                break;
            };
            let next = Self::parse_core(parser)?;
            select.unions.push(Union { all, select: next });
        }

        Ok(select)
    }

    fn parse_core(parser: &mut QueryParser) -> Result<Select, ParseError> {
        if !COMPARERS.select.consume(parser) {
            return parser.error("Expected SELECT").err();
        }

        let mut select = Select { distinct: COMPARERS.distinct.consume(parser), ..Default::default() };

        if parser.eof() || COMPARERS.from.compare(parser) {
            return parser.error("Expected result fields").err();
        }
        select.fields = ResultField::parse_list(parser)?;

        if COMPARERS.from.consume(parser) {
            select.from = Some(TableExpression::parse(parser)?);
        }

        while Join::is_join(parser) {
            select.joins.push(Join::parse(parser)?);
        }

        if COMPARERS.r#where.consume(parser) {
            select.criteria = Some(Expression::parse(parser)?);
        }

        if COMPARERS.group_by.consume(parser) {
            select.group_by.push(Expression::parse(parser)?);
            while parser.consume_symbol(",") {
                select.group_by.push(Expression::parse(parser)?);
            }
        }

        if COMPARERS.having.consume(parser) {
            select.having = Some(Expression::parse(parser)?);
        }

        if COMPARERS.order_by.consume(parser) {
            select.order_by = OrderExpression::parse_list(parser)?;
        }

        if COMPARERS.limit.consume(parser) {
            select.limit = Some(Expression::parse(parser)?);
        }

        if COMPARERS.offset.consume(parser) {
            select.offset = Some(Expression::parse(parser)?);
        }

        Ok(select)
    }
}

pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Shared tail of the four statement kinds.
pub(crate) fn write_tail(f: &mut fmt::Formatter<'_>, order_by: &[OrderExpression], limit: &Option<Expression>, offset: &Option<Expression>) -> fmt::Result {
    if !order_by.is_empty() {
        write!(f, " ORDER BY ")?;
        write_list(f, order_by)?;
    }
    if let Some(limit) = limit {
        write!(f, " LIMIT {}", limit)?;
    }
    if let Some(offset) = offset {
        write!(f, " OFFSET {}", offset)?;
    }
    Ok(())
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        write_list(f, &self.fields)?;

        if let Some(from) = &self.from {
            write!(f, " FROM {}", from)?;
        }
        for join in &self.joins {
            write!(f, " {}", join)?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {}", criteria)?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            write_list(f, &self.group_by)?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        write_tail(f, &self.order_by, &self.limit, &self.offset)?;

        for union in &self.unions {
            write!(f, " UNION {}{}", if union.all { "ALL " } else { "" }, union.select)?;
        }
        Ok(())
    }
}
