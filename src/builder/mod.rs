pub mod conditions;
pub use conditions::*;

pub mod ast_builder;
pub use ast_builder::*;

pub mod query_builder;
pub use query_builder::*;
