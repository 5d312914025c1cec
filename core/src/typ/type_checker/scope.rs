use std::{path::Path, sync::Arc};

use crate::{
    ast::NodeId,
    token::Span,
    typ::{TypeNamespace, TypeSet},
    util::{FastHashMap, fast_hash_map_new},
};

/// Assignment site of a binding, possibly in another file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub file: Arc<Path>,
    /// Target identifier of the assignment, in `file`'s tree.
    pub node: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub types: TypeSet,
    pub origins: Vec<Origin>,
}

impl Binding {
    fn merge(&mut self, other: &Binding) {
        self.types.union_with(&other.types);
        for origin in &other.origins {
            if !self.origins.contains(origin) {
                self.origins.push(origin.clone());
            }
        }
    }
}

/// Variables visible at one point of a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    vars: FastHashMap<String, Binding>,
}

impl Scope {
    pub fn new() -> Self {
        Scope { vars: fast_hash_map_new() }
    }

    /// Scope of a project's root file: the builtin global objects.
    pub fn root(ns: &TypeNamespace) -> Self {
        let mut scope = Scope::new();
        for (name, object) in ns.globals() {
            scope.vars.insert(
                name.to_string(),
                Binding {
                    types: TypeSet::single(object.as_type()),
                    origins: Vec::new(),
                },
            );
        }
        scope
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Bind `name`, replacing any earlier binding.
    pub fn assign(&mut self, name: &str, types: TypeSet, origin: Option<Origin>) {
        self.vars.insert(
            name.to_string(),
            Binding {
                types,
                origins: origin.into_iter().collect(),
            },
        );
    }

    /// Update the types of `name` and keep where it was declared.
    pub fn update(&mut self, name: &str, types: TypeSet, origin: Option<Origin>) {
        match self.vars.get_mut(name) {
            Some(binding) => binding.types = types,
            None => self.assign(name, types, origin),
        }
    }

    /// Join two control flow paths: every name of either side stays bound,
    /// with the union of its types.
    pub fn merge(&mut self, other: &Scope) {
        for (name, binding) in &other.vars {
            match self.vars.get_mut(name) {
                Some(existing) => existing.merge(binding),
                None => {
                    self.vars.insert(name.clone(), binding.clone());
                }
            }
        }
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
