//! Project model: where file text comes from, the shared AST cache and the
//! tree of `meson.build` files joined by `subdir()` calls.

mod cache;
mod source;
mod tree;


pub use cache::*;
pub use source::*;
pub use tree::*;
