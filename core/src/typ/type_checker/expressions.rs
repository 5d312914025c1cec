use super::TypeAnalyzer;
use crate::{
    ast::{NodeId, NodeKind},
    op::{BinOp, UnaryOp},
    token::Span,
    typ::{IdentifierRef, StringRef, Type, TypeSet},
};

/// Element type a value contributes when appended to a list.
fn list_item(ty: &Type) -> TypeSet {
    match ty {
        Type::List(inner) => inner.clone(),
        other => TypeSet::single(other.clone()),
    }
}

fn pair_result(op: BinOp, lhs: &Type, rhs: &Type) -> Option<Type> {
    if lhs.is_any_like() || rhs.is_any_like() {
        return Some(Type::Any);
    }
    match (op, lhs, rhs) {
        (BinOp::Add, Type::Int, Type::Int) => Some(Type::Int),
        (BinOp::Add, Type::Str, Type::Str) => Some(Type::Str),
        (BinOp::Add, Type::List(elements), other) => Some(Type::List(elements.union(&list_item(other)))),
        (BinOp::Add, Type::Dict(a), Type::Dict(b)) => Some(Type::Dict(a.union(b))),
        (BinOp::Div, Type::Str, Type::Str) => Some(Type::Str),
        (BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod, Type::Int, Type::Int) => Some(Type::Int),
        _ => None,
    }
}

/// Result types of `lhs op rhs` over every combination of operand types.
///
/// Operands with unknown types contribute nothing, so `unknown + int` is `int`.
pub fn binary_result(op: BinOp, lhs: &TypeSet, rhs: &TypeSet) -> TypeSet {
    if op.is_cmp() || op.is_logical() {
        return TypeSet::single(Type::Bool);
    }
    if lhs.is_empty() || rhs.is_empty() {
        return match op {
            BinOp::Add | BinOp::Div => lhs.union(rhs),
            _ => TypeSet::single(Type::Int),
        };
    }
    let mut out = TypeSet::new();
    for l in lhs {
        for r in rhs {
            if let Some(ty) = pair_result(op, l, r) {
                out.insert(ty);
            }
        }
    }
    out
}

/// `@name@` placeholders of a format string with their byte offsets in the value.
pub fn format_placeholders(value: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if end > start && end < bytes.len() && bytes[end] == b'@' && !bytes[start].is_ascii_digit() {
            out.push((start, &value[start..end]));
            i = end + 1;
        } else {
            i = start;
        }
    }
    out
}

impl TypeAnalyzer<'_> {
    /// Infer and record the types of an expression node.
    pub(super) fn expr(&mut self, id: NodeId) -> TypeSet {
        let types = self.expr_inner(id);
        self.types.insert(id, types.clone());
        types
    }

    fn expr_inner(&mut self, id: NodeId) -> TypeSet {
        let ast = self.ast;
        let span = ast.span(id);
        match ast.kind(id) {
            NodeKind::BooleanLiteral { .. } => TypeSet::single(Type::Bool),
            NodeKind::IntegerLiteral { .. } => TypeSet::single(Type::Int),
            NodeKind::StringLiteral { value, format, .. } => {
                self.meta.strings.push(StringRef {
                    node: id,
                    span,
                    value: value.clone(),
                });
                if *format {
                    self.check_placeholders(value, span);
                }
                TypeSet::single(Type::Str)
            }
            NodeKind::ArrayLiteral { elements } => {
                let mut inner = TypeSet::new();
                for element in elements {
                    inner.union_with(&self.expr(*element));
                }
                TypeSet::single(Type::List(inner))
            }
            NodeKind::DictionaryLiteral { items } => {
                let mut inner = TypeSet::new();
                for item in items {
                    if let NodeKind::KeyValueItem { key, value } = ast.kind(*item) {
                        self.expr(*key);
                        inner.union_with(&self.expr(*value));
                    }
                }
                TypeSet::single(Type::Dict(inner))
            }
            NodeKind::IdExpression { name } => self.identifier(id, name, span),
            NodeKind::UnaryExpression { op, expression } => {
                self.expr(*expression);
                match op {
                    UnaryOp::Not => TypeSet::single(Type::Bool),
                    UnaryOp::Neg => TypeSet::single(Type::Int),
                }
            }
            NodeKind::BinaryExpression { lhs, op, rhs } => {
                let l = self.expr(*lhs);
                let r = self.expr(*rhs);
                binary_result(*op, &l, &r)
            }
            NodeKind::ConditionalExpression {
                condition,
                if_true,
                if_false,
            } => {
                self.expr(*condition);
                let a = self.expr(*if_true);
                let b = self.expr(*if_false);
                a.union(&b)
            }
            NodeKind::SubscriptExpression { outer, inner } => {
                let container = self.expr(*outer);
                self.expr(*inner);
                self.subscript_result(&container)
            }
            NodeKind::FunctionExpression { .. } => self.function_call(id),
            NodeKind::MethodExpression { .. } => self.method_call(id),
            NodeKind::ErrorNode { .. } => TypeSet::new(),
            NodeKind::BuildDefinition { .. }
            | NodeKind::ArgumentList { .. }
            | NodeKind::AssignmentStatement { .. }
            | NodeKind::IterationStatement { .. }
            | NodeKind::SelectionStatement { .. }
            | NodeKind::KeyValueItem { .. }
            | NodeKind::KeywordItem { .. }
            | NodeKind::BreakNode
            | NodeKind::ContinueNode => TypeSet::new(),
        }
    }

    /// Read of a variable. An unknown name is an error and has no types.
    fn identifier(&mut self, id: NodeId, name: &str, span: Span) -> TypeSet {
        let (types, origins) = match self.scope.get(name) {
            Some(binding) => (binding.types.clone(), binding.origins.clone()),
            None => {
                self.error(format!("Unknown identifier '{}'", name), span);
                (TypeSet::new(), Vec::new())
            }
        };
        self.meta.identifiers.push(IdentifierRef {
            node: id,
            span,
            name: name.to_string(),
            types: types.clone(),
            origins,
        });
        types
    }

    fn check_placeholders(&mut self, value: &str, span: Span) {
        for (_, name) in format_placeholders(value) {
            if !self.scope.contains(name) {
                self.error(format!("Unknown identifier '{}' in format string", name), span);
            }
        }
    }

    fn subscript_result(&self, container: &TypeSet) -> TypeSet {
        let mut out = TypeSet::new();
        for ty in container {
            match ty {
                Type::Any | Type::Disabler => out.insert(Type::Any),
                Type::Str => out.insert(Type::Str),
                Type::List(elements) => out.union_with(elements),
                Type::Dict(values) => out.union_with(values),
                Type::Object(o) if &*o.name == "custom_tgt" => {
                    if let Some(idx) = self.ns.object_type("custom_idx") {
                        out.insert(idx);
                    }
                }
                _ => {}
            }
        }
        out
    }
}
