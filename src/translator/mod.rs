pub mod compiled_query;
pub use compiled_query::*;

pub mod query_cache;
pub use query_cache::*;

pub mod observer;
pub use observer::*;

#[allow(clippy::module_inception)]
pub mod translator;
pub use translator::*;
