pub mod analyzer_error;
pub use analyzer_error::*;

pub mod field_lookup;
pub use field_lookup::*;

pub mod type_inference;
pub use type_inference::*;

pub mod resolvers;
pub use resolvers::*;

pub mod pipeline;
pub use pipeline::*;
