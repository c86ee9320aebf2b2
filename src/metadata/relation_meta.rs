/// How the two sides of a relation are linked.
///
/// - `Forward`: the declaring entity holds `foreign_key`, pointing at the
///   target's identifier (`order.customerId -> customer.id`).
/// - `Inverse`: the target entity holds `foreign_key`, pointing back at the
///   declaring entity's identifier (`customer.orders -> order.customerId`).
/// - `Junction`: a link table with one column per side (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    Forward { foreign_key: String },
    Inverse { foreign_key: String },
    Junction { table: String, source_column: String, target_column: String },
}

/// A declared association from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMeta {
    pub target: String,
    pub kind: RelationKind,
    /// Extra join restriction in query syntax, written against the target's
    /// properties (`deleted = FALSE`).
    pub filter: Option<String>,
}

impl RelationMeta {
    pub fn forward(target: &str, foreign_key: &str) -> Self {
        Self::new(target, RelationKind::Forward { foreign_key: foreign_key.to_string() })
    }

    pub fn inverse(target: &str, foreign_key: &str) -> Self {
        Self::new(target, RelationKind::Inverse { foreign_key: foreign_key.to_string() })
    }

    pub fn junction(target: &str, table: &str, source_column: &str, target_column: &str) -> Self {
        Self::new(target, RelationKind::Junction {
            table: table.to_string(),
            source_column: source_column.to_string(),
            target_column: target_column.to_string(),
        })
    }

    fn new(target: &str, kind: RelationKind) -> Self {
        Self { target: target.to_string(), kind, filter: None }
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }
}
