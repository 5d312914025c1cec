//! The builtin catalog of the Meson DSL: object types, global functions,
//! methods and the modules reachable through `import()`.

mod builtins;
mod functions;
mod modules;
mod objects;


use std::sync::Arc;

use anyhow::{Context, Result};
use meson_core::typ::{NamespaceBuilder, TypeNamespace};
use once_cell::sync::OnceCell;

/// Register every builtin declaration with the given builder
pub fn register_catalog(ns: &mut NamespaceBuilder) {
    objects::register_types(ns);
    modules::register_types(ns);
    functions::register(ns);
    builtins::register(ns);
    objects::register_methods(ns);
    modules::register_methods(ns);
}

/// Build a fresh namespace from the catalog.
pub fn load_namespace() -> Result<TypeNamespace> {
    let mut builder = TypeNamespace::builder();
    register_catalog(&mut builder);
    let ns = builder.build().context("builtin catalog is inconsistent")?;
    tracing::debug!(
        objects = ns.objects().len(),
        functions = ns.functions().len(),
        "loaded builtin catalog"
    );
    Ok(ns)
}

static NAMESPACE: OnceCell<Arc<TypeNamespace>> = OnceCell::new();

/// The process-wide namespace, built on first use.
pub fn namespace() -> Result<Arc<TypeNamespace>> {
    NAMESPACE.get_or_try_init(|| load_namespace().map(Arc::new)).cloned()
}
