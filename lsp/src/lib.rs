//! Editor integration for Meson build files: project assembly across
//! `subdir()` calls, rebuild coordination, feature queries and the
//! language server binding.

pub mod features;
pub mod project;
pub mod server;
pub mod workspace;

pub use server::run;
