pub mod node;
pub use node::*;

pub mod visitor;
pub use visitor::*;

pub mod context;
pub use context::*;

#[allow(clippy::module_inception)]
pub mod walker;
pub use walker::*;
