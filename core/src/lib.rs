//! Parsing and type analysis for Meson build files.

pub mod ast;
pub mod diagnostic;
pub mod op;
pub mod parser;
pub mod token;
pub mod typ;
pub mod util;
