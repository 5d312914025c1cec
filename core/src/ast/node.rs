use std::sync::Arc;

use crate::{
    op::{AssignOp, BinOp, UnaryOp},
    token::{ParseError, Span},
};

/// Index of a node inside the arena of one file's [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// Meson syntax tree node kinds.
///
/// Children are referenced by [`NodeId`]; the arena owns every node of a file.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of a file: the list of top-level statements
    BuildDefinition { statements: Vec<NodeId> },
    /// `(a, b, key: value)`; elements are expressions or `KeywordItem`s
    ArgumentList { args: Vec<NodeId> },
    /// `[a, b]`
    ArrayLiteral { elements: Vec<NodeId> },
    /// `lhs op rhs` where `op` is `=`, `+=`, ...
    AssignmentStatement { lhs: NodeId, op: AssignOp, rhs: NodeId },
    BinaryExpression { lhs: NodeId, op: BinOp, rhs: NodeId },
    BooleanLiteral { value: bool },
    /// `condition ? if_true : if_false`
    ConditionalExpression {
        condition: NodeId,
        if_true: NodeId,
        if_false: NodeId,
    },
    /// `{k: v}`; elements are `KeyValueItem`s
    DictionaryLiteral { items: Vec<NodeId> },
    /// `name(args)`; `id` is an `IdExpression`
    FunctionExpression { id: NodeId, args: NodeId },
    IdExpression { name: String },
    /// `raw` keeps the literal as written (`0x1F`)
    IntegerLiteral { value: i64, raw: String },
    /// `foreach ids : expression ... endforeach`
    IterationStatement {
        ids: Vec<NodeId>,
        expression: NodeId,
        block: Vec<NodeId>,
    },
    KeyValueItem { key: NodeId, value: NodeId },
    /// `key: value` inside an argument list; `key` is an `IdExpression`
    KeywordItem { key: NodeId, value: NodeId },
    /// `object.id(args)`; `args` is absent when the call parentheses are missing
    MethodExpression {
        object: NodeId,
        id: NodeId,
        args: Option<NodeId>,
    },
    /// `if`/`elif`/`else`; `blocks` has one entry per condition plus an optional `else` block
    SelectionStatement {
        conditions: Vec<NodeId>,
        blocks: Vec<Vec<NodeId>>,
    },
    StringLiteral {
        value: String,
        format: bool,
        multiline: bool,
    },
    /// `outer[inner]`
    SubscriptExpression { outer: NodeId, inner: NodeId },
    UnaryExpression { op: UnaryOp, expression: NodeId },
    /// Region that could not be parsed
    ErrorNode { message: String },
    BreakNode,
    ContinueNode,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::BuildDefinition { .. } => "BuildDefinition",
            NodeKind::ArgumentList { .. } => "ArgumentList",
            NodeKind::ArrayLiteral { .. } => "ArrayLiteral",
            NodeKind::AssignmentStatement { .. } => "AssignmentStatement",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::BooleanLiteral { .. } => "BooleanLiteral",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::DictionaryLiteral { .. } => "DictionaryLiteral",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::IdExpression { .. } => "IdExpression",
            NodeKind::IntegerLiteral { .. } => "IntegerLiteral",
            NodeKind::IterationStatement { .. } => "IterationStatement",
            NodeKind::KeyValueItem { .. } => "KeyValueItem",
            NodeKind::KeywordItem { .. } => "KeywordItem",
            NodeKind::MethodExpression { .. } => "MethodExpression",
            NodeKind::SelectionStatement { .. } => "SelectionStatement",
            NodeKind::StringLiteral { .. } => "StringLiteral",
            NodeKind::SubscriptExpression { .. } => "SubscriptExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::ErrorNode { .. } => "ErrorNode",
            NodeKind::BreakNode => "BreakNode",
            NodeKind::ContinueNode => "ContinueNode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Syntactic parent; `None` only for the `BuildDefinition` root.
    pub parent: Option<NodeId>,
}

/// Syntax tree of one file.
///
/// All nodes live in one arena and are dropped together with it. Parent
/// links are plain indices into the same arena.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
    errors: Vec<ParseError>,
    source: Arc<str>,
}

impl Ast {
    pub(crate) fn builder(source: &str) -> Ast {
        Ast {
            nodes: Vec::new(),
            root: NodeId(0),
            errors: Vec::new(),
            source: Arc::from(source),
        }
    }

    pub(crate) fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    /// Drop every node pushed after the arena had `len` nodes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Seal the arena: record the root and link every child to its parent.
    pub(crate) fn finish(mut self, root: NodeId, errors: Vec<ParseError>) -> Ast {
        self.root = root;
        self.errors = errors;
        for index in 0..self.nodes.len() {
            let id = NodeId::from_index(index);
            for child in self.children(id) {
                self.nodes[child.index()].parent = Some(id);
            }
        }
        self.nodes[root.index()].parent = None;
        self
    }

    /// Parse `source` into a syntax tree. Never fails; see [`Ast::errors`].
    pub fn parse(source: &str) -> Ast {
        crate::parser::Parser::new(source).parse()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Syntax errors found while parsing, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_text(&self, span: Span) -> &str {
        self.source.get(span.start.offset..span.end.offset).unwrap_or("")
    }

    /// Source text covered by a node.
    pub fn text(&self, id: NodeId) -> &str {
        self.source_text(self.span(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }

    /// Name of an `IdExpression`.
    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::IdExpression { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Value of a `StringLiteral` that is not a format string.
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::StringLiteral {
                value, format: false, ..
            } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Callee name of a `FunctionExpression` or method name of a `MethodExpression`.
    pub fn call_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::FunctionExpression { id: callee, .. } => self.identifier(*callee),
            NodeKind::MethodExpression { id: member, .. } => self.identifier(*member),
            _ => None,
        }
    }

    /// Argument list node of a call, if any.
    pub fn call_args(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            NodeKind::FunctionExpression { args, .. } => Some(*args),
            NodeKind::MethodExpression { args, .. } => *args,
            _ => None,
        }
    }

    /// Positional arguments of a call in order.
    pub fn positional_args(&self, call: NodeId) -> Vec<NodeId> {
        match self.call_args(call).map(|a| self.kind(a)) {
            Some(NodeKind::ArgumentList { args }) => args
                .iter()
                .copied()
                .filter(|a| !matches!(self.kind(*a), NodeKind::KeywordItem { .. }))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Keyword arguments of a call as `(name, KeywordItem node)`.
    pub fn keyword_args(&self, call: NodeId) -> Vec<(&str, NodeId)> {
        match self.call_args(call).map(|a| self.kind(a)) {
            Some(NodeKind::ArgumentList { args }) => args
                .iter()
                .filter_map(|a| match self.kind(*a) {
                    NodeKind::KeywordItem { key, .. } => self.identifier(*key).map(|name| (name, *a)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Direct children in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::BuildDefinition { statements } => statements.clone(),
            NodeKind::ArgumentList { args } => args.clone(),
            NodeKind::ArrayLiteral { elements } => elements.clone(),
            NodeKind::AssignmentStatement { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::BinaryExpression { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::ConditionalExpression {
                condition,
                if_true,
                if_false,
            } => vec![*condition, *if_true, *if_false],
            NodeKind::DictionaryLiteral { items } => items.clone(),
            NodeKind::FunctionExpression { id, args } => vec![*id, *args],
            NodeKind::IterationStatement { ids, expression, block } => {
                let mut out = ids.clone();
                out.push(*expression);
                out.extend(block.iter().copied());
                out
            }
            NodeKind::KeyValueItem { key, value } | NodeKind::KeywordItem { key, value } => vec![*key, *value],
            NodeKind::MethodExpression { object, id, args } => {
                let mut out = vec![*object, *id];
                out.extend(*args);
                out
            }
            NodeKind::SelectionStatement { conditions, blocks } => {
                let mut out = Vec::new();
                for (i, block) in blocks.iter().enumerate() {
                    if let Some(cond) = conditions.get(i) {
                        out.push(*cond);
                    }
                    out.extend(block.iter().copied());
                }
                out
            }
            NodeKind::SubscriptExpression { outer, inner } => vec![*outer, *inner],
            NodeKind::UnaryExpression { expression, .. } => vec![*expression],
            NodeKind::BooleanLiteral { .. }
            | NodeKind::IdExpression { .. }
            | NodeKind::IntegerLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::ErrorNode { .. }
            | NodeKind::BreakNode
            | NodeKind::ContinueNode => Vec::new(),
        }
    }

    /// Parents of `id` from the nearest up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Innermost node whose span contains `(line, column)`.
    pub fn node_at(&self, line: u32, column: u32) -> Option<NodeId> {
        let mut current = self.root;
        if !self.span(current).contains(line, column) {
            return None;
        }
        'descend: loop {
            for child in self.children(current) {
                if self.span(child).contains(line, column) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}
