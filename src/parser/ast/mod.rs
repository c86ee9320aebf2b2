pub mod literal;
pub use literal::*;

pub mod operators;
pub use operators::*;

pub mod identifier;
pub use identifier::*;

pub mod parameter;
pub use parameter::*;

pub mod function;
pub use function::*;

pub mod case;
pub use case::*;

pub mod expression;
pub use expression::*;

pub mod table;
pub use table::*;

pub mod result_field;
pub use result_field::*;

pub mod order_expression;
pub use order_expression::*;

pub mod assignment;
pub use assignment::*;

pub mod facts;
pub use facts::*;

pub mod select;
pub use select::{Select, Union};

pub mod insert;
pub use insert::*;

pub mod update;
pub use update::*;

pub mod delete;
pub use delete::*;

pub mod query;
pub use query::*;
