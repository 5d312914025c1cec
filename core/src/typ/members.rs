use std::sync::Arc;

use super::{Function, Type, TypeNamespace};

/// Method `name` callable on a value of `ty`, searching up the parent chain.
pub fn find_method(ns: &TypeNamespace, ty: &Type, name: &str) -> Option<Arc<Function>> {
    match ty {
        Type::Object(object) => ns
            .ancestry(object.id)
            .find_map(|o| ns.method(&o.name, name))
            .cloned(),
        other => ns.method(other.vtable_name()?, name).cloned(),
    }
}

/// Every method callable on a value of `ty`. Methods of the type itself come
/// first; an inherited method is skipped when a nearer type overrides it.
pub fn methods_of(ns: &TypeNamespace, ty: &Type) -> Vec<Arc<Function>> {
    let mut out: Vec<Arc<Function>> = Vec::new();
    let mut push_all = |methods: &[Arc<Function>]| {
        for method in methods {
            if !out.iter().any(|m| m.name == method.name) {
                out.push(method.clone());
            }
        }
    };
    match ty {
        Type::Object(object) => {
            for o in ns.ancestry(object.id) {
                push_all(ns.vtable(&o.name));
            }
        }
        other => {
            if let Some(name) = other.vtable_name() {
                push_all(ns.vtable(name));
            }
        }
    }
    out
}
