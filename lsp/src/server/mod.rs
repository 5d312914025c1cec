mod config;
mod entry;
mod handlers;
mod state;
mod text;
mod utils;

#[cfg(test)]
mod config_test;

pub use entry::run;
pub(crate) use utils::compute_content_hash;
