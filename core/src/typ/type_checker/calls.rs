use std::sync::Arc;

use super::{SubdirScope, TypeAnalyzer};
use crate::{
    ast::{NodeId, NodeKind},
    token::Span,
    typ::{Function, FunctionCall, KwargRef, MethodCall, SubdirCall, Type, TypeSet, find_method},
};

/// Arguments of one call with their inferred types.
#[derive(Default)]
struct CallArgs {
    positional: Vec<(NodeId, TypeSet)>,
    kwargs: Vec<KeywordArg>,
}

struct KeywordArg {
    name: String,
    key_span: Span,
    value: NodeId,
    types: TypeSet,
}

impl CallArgs {
    fn positional_types(&self, index: usize) -> TypeSet {
        self.positional.get(index).map(|(_, t)| t.clone()).unwrap_or_default()
    }
}

impl TypeAnalyzer<'_> {
    fn evaluate_args(&mut self, call: NodeId, args: Option<NodeId>, function: Option<&Arc<Function>>) -> CallArgs {
        let mut out = CallArgs::default();
        let ast = self.ast;
        let Some(NodeKind::ArgumentList { args }) = args.map(|a| ast.kind(a)) else {
            return out;
        };
        for item in args {
            match ast.kind(*item) {
                NodeKind::KeywordItem { key, value } => {
                    let types = self.expr(*value);
                    let name = ast.identifier(*key).unwrap_or_default().to_string();
                    let key_span = ast.span(*key);
                    self.meta.kwargs.push(KwargRef {
                        node: *item,
                        span: key_span,
                        name: name.clone(),
                        call,
                        function: function.cloned(),
                    });
                    out.kwargs.push(KeywordArg {
                        name,
                        key_span,
                        value: *value,
                        types,
                    });
                }
                _ => {
                    let types = self.expr(*item);
                    out.positional.push((*item, types));
                }
            }
        }
        out
    }

    /// Check arity, keyword names and argument types against a signature.
    fn check_arguments(&mut self, function: &Function, args: &CallArgs, call_span: Span) {
        let callee = function.id();
        let given = args.positional.len();
        let required = function.min_positional();
        if given < required {
            let missing = function
                .positional()
                .filter(|p| !p.optional && !p.varargs)
                .nth(given)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            self.error(
                format!("Missing positional argument '{}' in call to '{}'", missing, callee),
                call_span,
            );
        }
        if let Some(max) = function.max_positional()
            && given > max
        {
            self.error(
                format!(
                    "Too many positional arguments in call to '{}': expected at most {}, got {}",
                    callee, max, given
                ),
                call_span,
            );
        }

        for (i, (node, types)) in args.positional.iter().enumerate() {
            if let Some(param) = function.positional_at(i)
                && !self.ns.accepts_some(&param.types, types)
            {
                let span = self.ast.span(*node);
                self.warning(
                    format!(
                        "Argument '{}' of '{}' expects {}, got {}",
                        param.name, callee, param.types, types
                    ),
                    span,
                );
            }
        }

        // `kwargs: some_dict` passes keyword arguments the analyzer cannot see
        let splat = args.kwargs.iter().any(|k| k.name == "kwargs");
        for kwarg in &args.kwargs {
            match function.kwarg(&kwarg.name) {
                None if kwarg.name == "kwargs" => {}
                None => self.error(
                    format!("Unknown keyword argument '{}' in call to '{}'", kwarg.name, callee),
                    kwarg.key_span,
                ),
                Some(expected) if !self.ns.accepts_some(&expected.types, &kwarg.types) => {
                    let span = self.ast.span(kwarg.value);
                    self.warning(
                        format!(
                            "Keyword argument '{}' of '{}' expects {}, got {}",
                            kwarg.name, callee, expected.types, kwarg.types
                        ),
                        span,
                    );
                }
                Some(_) => {}
            }
        }
        if !splat {
            for expected in function.kwargs().filter(|k| !k.optional) {
                if !args.kwargs.iter().any(|k| k.name == expected.name) {
                    self.error(
                        format!("Missing keyword argument '{}' in call to '{}'", expected.name, callee),
                        call_span,
                    );
                }
            }
        }
    }

    pub(super) fn function_call(&mut self, id: NodeId) -> TypeSet {
        let ast = self.ast;
        let NodeKind::FunctionExpression { id: callee, args } = ast.kind(id) else {
            return TypeSet::new();
        };
        let name = ast.identifier(*callee).unwrap_or_default();
        let name_span = ast.span(*callee);
        let span = ast.span(id);
        let function = self.ns.function(name).cloned();
        let call_args = self.evaluate_args(id, Some(*args), function.as_ref());

        let mut types = match &function {
            Some(f) => {
                self.check_arguments(f, &call_args, span);
                f.return_types.clone()
            }
            None => {
                self.error(format!("Unknown function '{}'", name), name_span);
                TypeSet::new()
            }
        };
        if let Some(special) = self.special_function(id, name, &call_args) {
            types = special;
        }

        self.meta.calls.push(FunctionCall {
            node: id,
            span,
            name: name.to_string(),
            name_span,
            function,
            types: types.clone(),
        });
        types
    }

    /// Literal string value of the positional argument at `index`.
    fn literal_arg(&self, args: &CallArgs, index: usize) -> Option<(NodeId, &str)> {
        let (node, _) = args.positional.get(index)?;
        self.ast.string_value(*node).map(|value| (*node, value))
    }

    /// Builtins whose result depends on their literal arguments.
    fn special_function(&mut self, call: NodeId, name: &str, args: &CallArgs) -> Option<TypeSet> {
        match name {
            "import" => {
                let (node, module) = self.literal_arg(args, 0)?;
                let module = module.to_string();
                match self.ns.module(&module) {
                    Some(object) => Some(TypeSet::single(object.as_type())),
                    None => {
                        let span = self.ast.span(node);
                        self.warning(format!("Unknown module '{}'", module), span);
                        self.ns.object_type("module").map(TypeSet::single)
                    }
                }
            }
            "get_variable" => {
                let (node, var) = self.literal_arg(args, 0)?;
                let var = var.to_string();
                let mut types = args.positional_types(1);
                match self.scope.get(&var) {
                    Some(binding) => types.union_with(&binding.types),
                    None if args.positional.len() < 2 => {
                        let span = self.ast.span(node);
                        self.error(format!("Unknown identifier '{}'", var), span);
                    }
                    None => {}
                }
                Some(types)
            }
            "set_variable" => {
                let (node, var) = self.literal_arg(args, 0)?;
                let var = var.to_string();
                let types = args.positional_types(1);
                let origin = self.origin(node);
                self.scope.assign(&var, types, Some(origin));
                None
            }
            "subdir" => {
                let span = self.ast.span(call);
                match self.literal_arg(args, 0) {
                    Some((_, dir)) => {
                        let dir = dir.to_string();
                        self.meta.subdir_calls.push(SubdirCall {
                            node: call,
                            span,
                            dir: Some(dir.clone()),
                        });
                        self.subdir_scopes.push(SubdirScope {
                            call,
                            dir,
                            scope: self.scope.clone(),
                        });
                    }
                    None => {
                        self.meta.subdir_calls.push(SubdirCall {
                            node: call,
                            span,
                            dir: None,
                        });
                        if !args.positional.is_empty() {
                            self.warning("subdir() argument is not a string literal, directory is skipped", span);
                        }
                    }
                }
                None
            }
            _ => None,
        }
    }

    /// Return types of `method` called on a value of `receiver`.
    fn method_result(&self, receiver: &Type, method: &Function, args: &CallArgs) -> TypeSet {
        let single = TypeSet::single(receiver.clone());
        match (receiver, method.name.as_str()) {
            (Type::List(_), "get") => single.list_elements().union(&args.positional_types(1)),
            (Type::Dict(_), "get") => single.dict_values().union(&args.positional_types(1)),
            (Type::Dict(_), "keys") => TypeSet::single(Type::List(TypeSet::single(Type::Str))),
            _ => method.return_types.clone(),
        }
    }

    pub(super) fn method_call(&mut self, id: NodeId) -> TypeSet {
        let ast = self.ast;
        let NodeKind::MethodExpression { object, id: member, args } = ast.kind(id) else {
            return TypeSet::new();
        };
        let receiver = self.expr(*object);
        let span = ast.span(id);
        let name_span = ast.span(*member);
        let Some(name) = ast.identifier(*member) else {
            self.evaluate_args(id, *args, None);
            return TypeSet::new();
        };

        let mut methods: Vec<Arc<Function>> = Vec::new();
        let mut candidates: Vec<(Type, Arc<Function>)> = Vec::new();
        let mut types = TypeSet::new();
        for ty in &receiver {
            if ty.is_any_like() {
                types.insert(ty.clone());
                continue;
            }
            if let Some(method) = find_method(self.ns, ty, name) {
                if !methods.iter().any(|m| Arc::ptr_eq(m, &method)) {
                    methods.push(method.clone());
                }
                candidates.push((ty.clone(), method));
            }
        }

        let call_args = self.evaluate_args(id, *args, methods.first());
        for (ty, method) in &candidates {
            types.union_with(&self.method_result(ty, method, &call_args));
        }

        if methods.is_empty() && !receiver.is_empty() && !receiver.has_any_like() {
            self.error(format!("Unknown method '{}' for type '{}'", name, receiver), name_span);
        }
        if let [method] = methods.as_slice() {
            let method = method.clone();
            self.check_arguments(&method, &call_args, span);
        }

        self.meta.method_calls.push(MethodCall {
            node: id,
            span,
            name: name.to_string(),
            name_span,
            receiver,
            methods,
            types: types.clone(),
        });
        types
    }
}
