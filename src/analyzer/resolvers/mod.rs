pub mod entity_resolver;
pub use entity_resolver::*;

pub mod subquery_mapping;
pub use subquery_mapping::*;

pub mod join_resolver;
pub use join_resolver::*;

pub mod identifier_resolver;
pub use identifier_resolver::*;

pub mod result_mapping;
pub use result_mapping::*;

pub mod parameter_resolver;
pub use parameter_resolver::*;
