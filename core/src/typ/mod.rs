mod members;
mod metadata;
mod namespace;
mod type_checker;
mod types;

#[cfg(test)]
mod namespace_test;
#[cfg(test)]
mod test_catalog;

pub use members::*;
pub use metadata::*;
pub use namespace::*;
pub use type_checker::*;
pub use types::*;
