use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    analyzer::Pipeline,
    compile_error::CompileError,
    config::Config,
    metadata::MetadataProvider,
    parser::ast::{Insert, Query},
    platform::Platform,
    translator::{CompileObserver, CompiledQuery, ParameterMap, QueryCache},
};

/// Turns query text or a built tree into a [`CompiledQuery`] for one
/// platform. A translator is immutable once configured and can be shared
/// between threads.
pub struct Translator {
    pipeline: Pipeline,
    platform: Arc<dyn Platform>,
    config: Config,
    cache: Option<Arc<dyn QueryCache>>,
    observers: Vec<Arc<dyn CompileObserver>>,
}

impl Translator {
    pub fn new(provider: Arc<dyn MetadataProvider>, platform: Arc<dyn Platform>, config: Config) -> Self {
        Self {
            pipeline: Pipeline::new(provider, &config),
            platform,
            config,
            cache: None,
            observers: Vec::new(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CompileObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse and compile `text`, reusing an earlier result for the same text
    /// when memoization is on and a cache is attached.
    pub fn translate(&self, text: &str) -> Result<Arc<CompiledQuery>, CompileError> {
        let cache = match &self.cache {
            Some(cache) if self.config.memoize => cache,
            _ => return self.translate_text(text).map(Arc::new),
        };

        let mut miss = false;
        let compiled = cache.get(text, &mut || {
            miss = true;
            self.translate_text(text)
        })?;
        debug!(cache_hit = !miss, platform = self.platform.name(), "translate");

        Ok(compiled)
    }

    fn translate_text(&self, text: &str) -> Result<CompiledQuery, CompileError> {
        let query = Query::try_from(text).map_err(|err| {
            debug!(error = %err, "query text rejected");
            CompileError::from(err)
        })?;
        self.compile(query)
    }

    /// Resolve and render an already built tree.
    pub fn compile(&self, mut query: Query) -> Result<CompiledQuery, CompileError> {
        debug!(kind = query.kind(), platform = self.platform.name(), "compile");

        self.observers.iter().for_each(|observer| observer.before_resolution(&query));
        self.pipeline.run(&mut query).map_err(|err| self.report(err))?;

        self.observers.iter().for_each(|observer| observer.before_rendering(&query));
        let sql = self.platform.render(&query).map_err(|err| self.report(err))?;

        let generated_value = match &query {
            Query::Insert(insert) if !self.platform.supports_returning() => self.generated_value(insert),
            _ => None,
        };

        let facts = query.facts_mut();
        let compiled = CompiledQuery {
            sql,
            parameters: ParameterMap::new(std::mem::take(&mut facts.parameters)),
            result_map: std::mem::take(&mut facts.result_fields),
            generated_value,
        };

        debug!(
            kind = query.kind(),
            sql_len = compiled.sql.len(),
            parameters = compiled.parameters.len(),
            "compiled"
        );
        Ok(compiled)
    }

    fn generated_value(&self, insert: &Insert) -> Option<String> {
        let table = insert.table.name()?;
        let column = insert.returning.first()?.expression.underlying_identifier()?.name();
        self.platform.generated_value_sql(table, column)
    }

    fn report(&self, err: CompileError) -> CompileError {
        if err.is_internal() {
            error!(error = %err, "compiler invariant violated");
        } else {
            debug!(error = %err, "query rejected");
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use serde_json::{json, Value};

    use crate::{
        analyzer::AnalyzerError,
        builder::{Conditions, QueryBuilder},
        compile_error::CompileError,
        config::Config,
        fixtures,
        metadata::{EntityMeta, EntityRegistry, FieldMeta, FieldType},
        parser::ast::{Bindings, ParameterKey, ParameterSlot, Query},
        platform::{GenericPlatform, MySqlPlatform, PostgresPlatform},
        translator::{CompileObserver, MemoryQueryCache, QueryCache, Translator},
    };

    fn translator() -> Translator {
        Translator::new(fixtures::provider(), Arc::new(GenericPlatform::new()), Config::default())
    }

    #[test]
    pub fn test_translate_lowercase_entity() {
        let registry = EntityRegistry::new().with(
            EntityMeta::new("user", "users")
                .with_field("id", FieldMeta::new("id", FieldType::Int))
                .with_field("name", FieldMeta::new("name", FieldType::String))
                .with_identifier(&["id"]),
        );
        let translator = Translator::new(Arc::new(registry), Arc::new(GenericPlatform::new()), Config::default());

        let compiled = translator.translate("SELECT id, name FROM user WHERE id = ?").unwrap();

        assert_eq!(compiled.sql, r#"SELECT "id", "name" FROM "users" WHERE "id" = ?"#);
        assert_eq!(compiled.result_names(), vec!["id", "name"]);
        assert_eq!(compiled.result_map["id"].ty, Some(FieldType::Int));
        assert_eq!(
            compiled.parameters.slots(),
            &[ParameterSlot::Required { key: ParameterKey::Position(0), ty: Some(FieldType::Int) }]
        );
        assert_eq!(compiled.bind(&Bindings::positional(vec![json!(3)])).unwrap(), vec![json!(3)]);
    }

    #[test]
    pub fn test_compile_built_query() {
        let built = QueryBuilder::select("Member")
            .fields(&["id", "status"])
            .filter(Conditions::try_from(&json!({"status": "active", "age >": 18})).unwrap())
            .build()
            .unwrap();
        let bindings = built.bindings();

        let compiled = translator().compile(built.query).unwrap();

        assert_eq!(compiled.sql, r#"SELECT "id", "status" FROM "members" WHERE "status" = ? AND "age" > ?"#);
        assert_eq!(compiled.bind(&bindings).unwrap(), vec![json!("active"), json!(18)]);
        assert_eq!(
            compiled.parameters.slots().iter().map(ParameterSlot::ty).collect::<Vec<_>>(),
            vec![Some(FieldType::String), Some(FieldType::Int)]
        );
    }

    #[test]
    pub fn test_relation_join_and_result_map() {
        let compiled = translator()
            .translate("SELECT c.name, o.total AS amount FROM Customer c JOIN c.orders o WHERE o.status = :status")
            .unwrap();

        assert_eq!(
            compiled.sql,
            r#"SELECT "c"."name", "o"."total" AS "amount" FROM "customers" "c" INNER JOIN "orders" "o" ON "o"."customerId" = "c"."id" WHERE "o"."status" = ?"#
        );
        assert_eq!(compiled.result_names(), vec!["name", "amount"]);
        assert_eq!(compiled.result_map["amount"].ty, Some(FieldType::Float));

        let err = compiled.bind(&Bindings::new()).unwrap_err();
        assert_eq!(err, AnalyzerError::MissingParameter(":status".into()));
        assert_eq!(
            compiled.bind(&Bindings::new().with("status", json!("open"))).unwrap(),
            vec![json!("open")]
        );
    }

    #[test]
    pub fn test_memoized_by_text() {
        let cache = Arc::new(MemoryQueryCache::new());
        let translator = translator().with_cache(Arc::clone(&cache) as Arc<dyn QueryCache>);

        let first = translator.translate("SELECT t.label FROM Tag t").unwrap();
        let second = translator.translate("SELECT t.label FROM Tag t").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        assert!(translator.translate("SELECT t.missing FROM Tag t").is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.slots(), 1);
    }

    #[test]
    pub fn test_no_cache_config_bypasses_cache() {
        let cache = Arc::new(MemoryQueryCache::new());
        let translator = Translator::new(fixtures::provider(), Arc::new(GenericPlatform::new()), Config::no_cache())
            .with_cache(Arc::clone(&cache) as Arc<dyn QueryCache>);

        let first = translator.translate("SELECT t.label FROM Tag t").unwrap();
        let second = translator.translate("SELECT t.label FROM Tag t").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert!(cache.is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        count: AtomicUsize,
    }

    impl CompileObserver for Recorder {
        fn before_resolution(&self, query: &Query) {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(format!("resolve {}", query));
        }

        fn before_rendering(&self, query: &Query) {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(format!("render {}", query));
        }
    }

    #[test]
    pub fn test_observers_see_both_stages() {
        let recorder = Arc::new(Recorder::default());
        let translator = translator().with_observer(Arc::clone(&recorder) as Arc<dyn CompileObserver>);

        translator.translate("SELECT u.name FROM User u").unwrap();

        assert_eq!(recorder.count.load(Ordering::SeqCst), 2);
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec!["resolve SELECT u.name FROM User u".to_string(), "render SELECT u.name FROM users u".to_string()]
        );
    }

    #[test]
    pub fn test_generated_value_without_returning() {
        let mysql = Translator::new(fixtures::provider(), Arc::new(MySqlPlatform::new()), Config::default());
        let compiled = mysql.translate("INSERT INTO User (name) VALUES (?) RETURNING id").unwrap();
        assert_eq!(compiled.sql, "INSERT INTO `users` (`name`) VALUES (?)");
        assert_eq!(compiled.generated_value.as_deref(), Some("SELECT LAST_INSERT_ID()"));

        let postgres = Translator::new(fixtures::provider(), Arc::new(PostgresPlatform::new()), Config::default());
        let compiled = postgres.translate("INSERT INTO User (name) VALUES (?) RETURNING id").unwrap();
        assert_eq!(compiled.sql, r#"INSERT INTO "users" ("name") VALUES ($1) RETURNING "id""#);
        assert_eq!(compiled.generated_value, None);
    }

    #[test]
    pub fn test_errors_by_category() {
        let translator = translator();

        assert!(matches!(translator.translate("SELECT FROM"), Err(CompileError::Parse(_))));
        assert!(matches!(
            translator.translate("SELECT x.id FROM User u"),
            Err(CompileError::Query(AnalyzerError::UnknownAlias(_)))
        ));
    }

    #[test]
    pub fn test_artifact_serializes() {
        let compiled = translator().translate("SELECT m.id FROM Member m WHERE m.active = ?").unwrap();
        let value: Value = serde_json::to_value(compiled.as_ref()).unwrap();

        assert_eq!(value["sql"], json!(r#"SELECT "m"."id" FROM "members" "m" WHERE "m"."active" = ?"#));
        assert_eq!(value["result_map"]["id"]["column"], json!("id"));
        assert_eq!(value["generated_value"], Value::Null);
    }
}
