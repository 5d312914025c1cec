mod error;
mod lexer;

#[cfg(test)]
mod token_test;

pub use error::*;
pub use lexer::*;
