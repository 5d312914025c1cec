mod node;
mod visitor;

#[cfg(test)]
mod ast_test;

pub use node::*;
pub use visitor::*;
