use thiserror::Error;

/// Semantic errors: the query is well formed but does not make sense against
/// the entity metadata, or cannot be bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    #[error("Unknown relation {relation} on {entity}")]
    UnknownRelation { entity: String, relation: String },

    #[error("Unknown field: {name} (candidates: {})", candidates.join(", "))]
    UnknownField { name: String, candidates: Vec<String> },

    #[error("Ambiguous identifier: {name} (matches: {})", matches.join(", "))]
    AmbiguousIdentifier { name: String, matches: Vec<String> },

    #[error("Field {0} has no sub-properties")]
    NoSubfields(String),

    #[error("Alias already registered: {alias}")]
    DuplicateAlias { alias: String },

    #[error("Duplicate result alias: {alias}")]
    DuplicateResultAlias { alias: String },

    #[error("Expression needs an alias: {expression}")]
    MissingAlias { expression: String },

    #[error("Cannot complete join {alias}: {reason}")]
    IncompleteJoin { alias: String, reason: String },

    #[error("Entity {entity} needs exactly one identifier property, has [{}]", properties.join(", "))]
    NoSingleIdentifier { entity: String, properties: Vec<String> },

    #[error("No value for named parameter :{0}")]
    UnmatchedNamedParameter(String),

    #[error("Missing value for parameter {0}")]
    MissingParameter(String),

    #[error("Invalid IN operand for {field}: {reason}")]
    InvalidInOperand { field: String, reason: String },

    #[error("Unsupported operator '{operator}' in condition {condition}")]
    InvalidOperator { operator: String, condition: String },

    #[error("Invalid query construction: {0}")]
    QueryConstruction(String),

    #[error("Cannot convert {value} to {target}")]
    InvalidValue { value: String, target: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_messages_name_the_culprit() {
        let err = AnalyzerError::AmbiguousIdentifier { name: "name".into(), matches: vec!["u.name".into(), "c.name".into()] };
        assert_eq!(err.to_string(), "Ambiguous identifier: name (matches: u.name, c.name)");

        let err = AnalyzerError::MissingParameter(":status".into());
        assert_eq!(err.to_string(), "Missing value for parameter :status");
    }
}
