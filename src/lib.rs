pub mod config;
pub use config::Config;

pub mod compile_error;
pub use compile_error::{CompileError, InternalError};

pub mod metadata;
pub use metadata::{EntityMeta, EntityRegistry, FieldMeta, FieldType, MetadataProvider, RelationMeta};

pub mod parser;
pub use parser::ParseError;

pub mod walker;

pub mod analyzer;
pub use analyzer::{AnalyzerError, Pipeline};

pub mod builder;
pub use builder::{BuiltQuery, Conditions, QueryBuilder};

pub mod platform;
pub use platform::{GenericPlatform, MySqlPlatform, Platform, PostgresPlatform};

pub mod translator;
pub use translator::{CompileObserver, CompiledQuery, MemoryQueryCache, ParameterMap, QueryCache, Translator};

#[cfg(test)]
pub mod fixtures;
