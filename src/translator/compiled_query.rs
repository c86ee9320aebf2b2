use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    analyzer::AnalyzerError,
    parser::ast::{Bindings, ParameterKey, ParameterSlot, ResultColumn},
    platform::Platform,
};

/// Parameter slots of a compiled query in native placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterMap {
    slots: Vec<ParameterSlot>,
}

impl ParameterMap {
    pub fn new(slots: Vec<ParameterSlot>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Keys the caller has to supply, in placeholder order.
    pub fn required(&self) -> impl Iterator<Item = &ParameterKey> {
        self.slots.iter().filter_map(|slot| match slot {
            ParameterSlot::Required { key, .. } => Some(key),
            ParameterSlot::Fixed { .. } => None,
        })
    }

    /// One value per placeholder. Fixed slots contribute their embedded
    /// value; a required slot with no binding is an error naming it.
    pub fn bind(&self, bindings: &Bindings) -> Result<Vec<Value>, AnalyzerError> {
        self.slots.iter()
            .map(|slot| match slot {
                ParameterSlot::Fixed { value, .. } => Ok(value.clone()),
                ParameterSlot::Required { key, .. } => bindings.get(key).cloned().ok_or_else(|| {
                    let name = match key {
                        ParameterKey::Name(name) => format!(":{}", name),
                        ParameterKey::Position(position) => format!("at position {}", position),
                    };
                    AnalyzerError::MissingParameter(name)
                }),
            })
            .collect()
    }

    /// [`bind`](Self::bind), then convert every value through the platform
    /// according to its slot type.
    pub fn bind_for(&self, bindings: &Bindings, platform: &dyn Platform) -> Result<Vec<Value>, AnalyzerError> {
        let values = self.bind(bindings)?;
        self.slots.iter()
            .zip(values.iter())
            .map(|(slot, value)| platform.to_database(value, slot.ty()))
            .collect()
    }
}

/// The immutable product of a compilation, safe to cache and to share
/// between executions with different bound values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub parameters: ParameterMap,
    /// Output name -> column, in select order
    pub result_map: IndexMap<String, ResultColumn>,
    /// Statement fetching the generated key when the dialect cannot return it
    pub generated_value: Option<String>,
}

impl CompiledQuery {
    pub fn bind(&self, bindings: &Bindings) -> Result<Vec<Value>, AnalyzerError> {
        self.parameters.bind(bindings)
    }

    pub fn result_names(&self) -> Vec<&str> {
        self.result_map.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        analyzer::AnalyzerError,
        metadata::FieldType,
        parser::ast::{Bindings, ParameterKey, ParameterSlot},
        platform::MySqlPlatform,
        translator::ParameterMap,
    };

    fn map() -> ParameterMap {
        ParameterMap::new(vec![
            ParameterSlot::Required { key: ParameterKey::Name("status".into()), ty: Some(FieldType::String) },
            ParameterSlot::Fixed { value: json!(true), ty: Some(FieldType::Bool) },
            ParameterSlot::Required { key: ParameterKey::Position(0), ty: Some(FieldType::Int) },
        ])
    }

    #[test]
    pub fn test_bind_in_placeholder_order() {
        let bindings = Bindings::positional(vec![json!(7)]).with("status", json!("open"));
        assert_eq!(map().bind(&bindings).unwrap(), vec![json!("open"), json!(true), json!(7)]);
        assert_eq!(map().required().count(), 2);
    }

    #[test]
    pub fn test_missing_binding_names_the_parameter() {
        let err = map().bind(&Bindings::positional(vec![json!(7)])).unwrap_err();
        assert_eq!(err, AnalyzerError::MissingParameter(":status".into()));
        assert_eq!(err.to_string(), "Missing value for parameter :status");

        let err = map().bind(&Bindings::new().with("status", json!("x"))).unwrap_err();
        assert_eq!(err, AnalyzerError::MissingParameter("at position 0".into()));
    }

    #[test]
    pub fn test_bind_for_converts_values() {
        let bindings = Bindings::positional(vec![json!(7)]).with("status", json!("open"));
        let values = map().bind_for(&bindings, &MySqlPlatform::new()).unwrap();
        assert_eq!(values, vec![json!("open"), json!(1), json!(7)]);
    }
}
