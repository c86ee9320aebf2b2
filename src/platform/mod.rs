pub mod value_conversion;
pub use value_conversion::*;

pub mod function_registry;
pub use function_registry::*;

pub mod render_context;
pub use render_context::*;

pub mod sql_renderer;
pub use sql_renderer::*;

#[allow(clippy::module_inception)]
pub mod platform;
pub use platform::*;

pub mod generic;
pub use generic::*;

pub mod postgres;
pub use postgres::*;

pub mod mysql;
pub use mysql::*;
