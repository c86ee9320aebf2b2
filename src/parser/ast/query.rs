use std::fmt;

use crate::parser::{
    ast::{Bindings, Delete, Insert, QueryFacts, Select, Update},
    ParseError, QueryParser, COMPARERS,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Select(Box<Select>),
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),
}

impl Query {
    pub fn parse(parser: &mut QueryParser) -> Result<Query, ParseError> {
        let query = if COMPARERS.select.compare(parser) {
            Query::Select(Box::new(Select::parse(parser)?))
        } else if COMPARERS.insert_into.compare(parser) {
            Query::Insert(Box::new(Insert::parse(parser)?))
        } else if COMPARERS.update.compare(parser) {
            Query::Update(Box::new(Update::parse(parser)?))
        } else if COMPARERS.delete_from.compare(parser) {
            Query::Delete(Box::new(Delete::parse(parser)?))
        } else {
            return parser.error("Expected SELECT, INSERT, UPDATE or DELETE").err();
        };

        parser.finish()?;
        Ok(query)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Query::Select(_) => "select",
            Query::Insert(_) => "insert",
            Query::Update(_) => "update",
            Query::Delete(_) => "delete",
        }
    }

    pub fn facts(&self) -> &QueryFacts {
        match self {
            Query::Select(select) => &select.facts,
            Query::Insert(insert) => &insert.facts,
            Query::Update(update) => &update.facts,
            Query::Delete(delete) => &delete.facts,
        }
    }

    pub fn facts_mut(&mut self) -> &mut QueryFacts {
        match self {
            Query::Select(select) => &mut select.facts,
            Query::Insert(insert) => &mut insert.facts,
            Query::Update(update) => &mut update.facts,
            Query::Delete(delete) => &mut delete.facts,
        }
    }

    /// Attach compile-time values; parameter references without a value of
    /// their own take theirs from here and become fixed slots.
    pub fn with_literals(mut self, literals: Bindings) -> Self {
        self.facts_mut().literals = Some(literals);
        self
    }
}

impl TryFrom<&str> for Query {
    type Error = ParseError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut parser = QueryParser::new(text)?;
        Query::parse(&mut parser)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Select(select) => write!(f, "{}", select),
            Query::Insert(insert) => write!(f, "{}", insert),
            Query::Update(update) => write!(f, "{}", update),
            Query::Delete(delete) => write!(f, "{}", delete),
        }
    }
}
