use std::path::Path;

use meson_core::{
    ast::{Ast, NodeId, NodeKind, Visitor, Walk},
    token::{Span, Token, Tokenizer},
};
use tower_lsp::lsp_types::{SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend};

use super::{is_binding_site, is_variable};
use crate::project::MesonTree;

const FUNCTION: u32 = 0;
const METHOD: u32 = 1;
const VARIABLE: u32 = 2;
const PARAMETER: u32 = 3;
const STRING: u32 = 4;
const NUMBER: u32 = 5;
const KEYWORD: u32 = 6;

const DECLARATION: u32 = 1 << 0;

/// Token types and modifiers, indexed by the constants above.
pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::FUNCTION,
            SemanticTokenType::METHOD,
            SemanticTokenType::VARIABLE,
            SemanticTokenType::PARAMETER,
            SemanticTokenType::STRING,
            SemanticTokenType::NUMBER,
            SemanticTokenType::KEYWORD,
        ],
        token_modifiers: vec![SemanticTokenModifier::DECLARATION],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RawToken {
    line: u32,
    column: u32,
    length: u32,
    kind: u32,
    modifiers: u32,
}

#[derive(Default)]
struct Collector(Vec<RawToken>);

impl Collector {
    /// Tokens spanning lines are dropped; not every client can render them.
    fn push(&mut self, span: Span, kind: u32, modifiers: u32) {
        if span.start.line != span.end.line || span.end.column <= span.start.column {
            return;
        }
        self.0.push(RawToken {
            line: span.start.line,
            column: span.start.column,
            length: span.end.column - span.start.column,
            kind,
            modifiers,
        });
    }
}

impl Visitor for Collector {
    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        let parent = ast.parent(id).map(|p| ast.kind(p));
        let kind = match parent {
            Some(NodeKind::FunctionExpression { id: callee, .. }) if *callee == id => FUNCTION,
            Some(NodeKind::MethodExpression { id: member, .. }) if *member == id => METHOD,
            Some(NodeKind::KeywordItem { key, .. }) if *key == id => PARAMETER,
            _ => VARIABLE,
        };
        let modifiers = if kind == VARIABLE && is_variable(ast, id) && is_binding_site(ast, id) {
            DECLARATION
        } else {
            0
        };
        self.push(ast.span(id), kind, modifiers);
        Walk::Continue
    }

    fn visit_string_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.push(ast.span(id), STRING, 0);
        Walk::Continue
    }

    fn visit_integer_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.push(ast.span(id), NUMBER, 0);
        Walk::Continue
    }
}

/// Semantic tokens of a whole file, delta encoded.
pub fn semantic_tokens(tree: &MesonTree, file: &Path) -> Vec<SemanticToken> {
    let Some(ast) = tree.ast_for(file) else {
        return Vec::new();
    };
    let mut collector = Collector::default();
    ast.walk(&mut collector);

    let lexed = Tokenizer::tokenize(ast.source());
    for (token, span) in lexed.tokens.iter().zip(&lexed.spans) {
        if token.is_keyword() || matches!(token, Token::Bool(_)) {
            collector.push(*span, KEYWORD, 0);
        }
    }

    let mut raw = collector.0;
    raw.sort();
    raw.dedup_by_key(|t| (t.line, t.column));
    encode(&raw)
}

fn encode(raw: &[RawToken]) -> Vec<SemanticToken> {
    let mut out = Vec::with_capacity(raw.len());
    let (mut line, mut column) = (0u32, 0u32);
    for token in raw {
        let delta_line = token.line - line;
        let delta_start = if delta_line == 0 {
            token.column - column
        } else {
            token.column
        };
        out.push(SemanticToken {
            delta_line,
            delta_start,
            length: token.length,
            token_type: token.kind,
            token_modifiers_bitset: token.modifiers,
        });
        line = token.line;
        column = token.column;
    }
    out
}
