use once_cell::sync::Lazy;

use crate::parser::{QueryParser, WordComparer};

/// Shared keyword table; comparers are immutable so one instance serves every parser.
pub static COMPARERS: Lazy<QueryComparers> = Lazy::new(QueryComparers::new);

#[derive(Debug)]
pub struct QueryComparers {
    pub select: WordComparer,
    pub distinct: WordComparer,
    pub alias: WordComparer,
    pub from: WordComparer,
    pub join: WordComparer,
    pub inner_join: WordComparer,
    pub left_join: WordComparer,
    pub left_outer_join: WordComparer,
    pub on: WordComparer,
    pub r#where: WordComparer,
    pub group_by: WordComparer,
    pub having: WordComparer,
    pub order_by: WordComparer,
    pub asc: WordComparer,
    pub desc: WordComparer,
    pub limit: WordComparer,
    pub offset: WordComparer,
    pub union: WordComparer,
    pub union_all: WordComparer,
    pub insert_into: WordComparer,
    pub values: WordComparer,
    pub update: WordComparer,
    pub set: WordComparer,
    pub delete_from: WordComparer,
    pub returning: WordComparer,
    pub and: WordComparer,
    pub or: WordComparer,
    pub not: WordComparer,
    pub like: WordComparer,
    pub not_like: WordComparer,
    pub contains: WordComparer,
    pub is: WordComparer,
    pub is_not: WordComparer,
    pub r#in: WordComparer,
    pub not_in: WordComparer,
    pub b_true: WordComparer,
    pub b_false: WordComparer,
    pub null: WordComparer,
    pub case: WordComparer,
    pub when: WordComparer,
    pub then: WordComparer,
    pub r#else: WordComparer,
    pub end: WordComparer,
}

impl Default for QueryComparers {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComparers {
    pub fn new() -> Self {
        Self {
            select: WordComparer::new("SELECT"),
            distinct: WordComparer::new("DISTINCT"),
            alias: WordComparer::new("AS"),
            from: WordComparer::new("FROM"),
            join: WordComparer::new("JOIN"),
            inner_join: WordComparer::new("INNER JOIN"),
            left_join: WordComparer::new("LEFT JOIN"),
            left_outer_join: WordComparer::new("LEFT OUTER JOIN"),
            on: WordComparer::new("ON"),
            r#where: WordComparer::new("WHERE"),
            group_by: WordComparer::new("GROUP BY"),
            having: WordComparer::new("HAVING"),
            order_by: WordComparer::new("ORDER BY"),
            asc: WordComparer::new("ASC"),
            desc: WordComparer::new("DESC"),
            limit: WordComparer::new("LIMIT"),
            offset: WordComparer::new("OFFSET"),
            union: WordComparer::new("UNION"),
            union_all: WordComparer::new("UNION ALL"),
            insert_into: WordComparer::new("INSERT INTO"),
            values: WordComparer::new("VALUES"),
            update: WordComparer::new("UPDATE"),
            set: WordComparer::new("SET"),
            delete_from: WordComparer::new("DELETE FROM"),
            returning: WordComparer::new("RETURNING"),
            and: WordComparer::new("AND"),
            or: WordComparer::new("OR"),
            not: WordComparer::new("NOT"),
            like: WordComparer::new("LIKE"),
            not_like: WordComparer::new("NOT LIKE"),
            contains: WordComparer::new("CONTAINS"),
            is: WordComparer::new("IS"),
            is_not: WordComparer::new("IS NOT"),
            r#in: WordComparer::new("IN"),
            not_in: WordComparer::new("NOT IN"),
            b_true: WordComparer::new("TRUE"),
            b_false: WordComparer::new("FALSE"),
            null: WordComparer::new("NULL"),
            case: WordComparer::new("CASE"),
            when: WordComparer::new("WHEN"),
            then: WordComparer::new("THEN"),
            r#else: WordComparer::new("ELSE"),
            end: WordComparer::new("END"),
        }
    }

    /// Keywords that close a table expression or a join.
    pub fn is_clause_start(&self, parser: &QueryParser) -> bool {
        self.r#where.compare(parser) || self.group_by.compare(parser) || self.having.compare(parser)
            || self.order_by.compare(parser) || self.limit.compare(parser) || self.offset.compare(parser)
            || self.union.compare(parser) || self.is_join_start(parser) || self.on.compare(parser)
            || self.set.compare(parser) || self.values.compare(parser)
    }

    pub fn is_join_start(&self, parser: &QueryParser) -> bool {
        self.join.compare(parser) || self.inner_join.compare(parser) || self.left_join.compare(parser)
            || self.left_outer_join.compare(parser)
    }
}
