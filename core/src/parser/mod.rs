mod expressions;
mod statements;


use crate::{
    ast::{Ast, NodeId, NodeKind},
    token::{ParseError, Position, Span, Token, Tokenizer, offset_to_position},
};

type PResult<T> = Result<T, ParseError>;

/// Deepest recursion the parser enters for brackets, unary operators,
/// conditional branches and nested blocks.
pub const MAX_NESTING: usize = 100;
/// Tallest expression tree accepted, so that later passes over the tree
/// stay within a thread's stack.
pub const MAX_EXPRESSION_HEIGHT: u32 = 128;

/// Recursive descent parser for Meson build files.
///
/// Parsing never fails. A statement that cannot be parsed is replaced by an
/// `ErrorNode` spanning up to the end of its line, and the error is recorded
/// on the resulting [`Ast`].
pub struct Parser {
    tokens: Vec<Token>,
    spans: Vec<Span>,
    pos: usize,
    /// Bracket nesting; line breaks are insignificant while it is non-zero.
    depth: usize,
    /// Active recursive descents, bounded by [`MAX_NESTING`].
    nesting: usize,
    /// Height of every node pushed so far, indexed like the arena.
    heights: Vec<u32>,
    eof: Position,
    ast: Ast,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        let lexed = Tokenizer::tokenize(source);
        Parser {
            tokens: lexed.tokens,
            spans: lexed.spans,
            pos: 0,
            depth: 0,
            nesting: 0,
            heights: Vec::new(),
            eof: offset_to_position(source, source.len()),
            ast: Ast::builder(source),
            errors: lexed.errors,
        }
    }

    pub fn parse(mut self) -> Ast {
        let statements = self.parse_block(true);
        let root = self.ast.push(
            NodeKind::BuildDefinition { statements },
            Span::new(Position::start(), self.eof),
        );
        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| e.span.start.offset);
        self.ast.finish(root, errors)
    }

    fn skip_insignificant(&mut self) {
        if self.depth > 0 {
            while self.tokens.get(self.pos) == Some(&Token::Newline) {
                self.pos += 1;
            }
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.skip_insignificant();
        self.tokens.get(self.pos)
    }

    /// Token after the current one, skipping line breaks inside brackets.
    fn peek_second(&mut self) -> Option<&Token> {
        self.skip_insignificant();
        let mut idx = self.pos + 1;
        if self.depth > 0 {
            while self.tokens.get(idx) == Some(&Token::Newline) {
                idx += 1;
            }
        }
        self.tokens.get(idx)
    }

    fn at(&mut self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    /// Span of the current token, or an empty span at the end of input.
    fn current_span(&mut self) -> Span {
        self.skip_insignificant();
        self.spans.get(self.pos).copied().unwrap_or(Span::single(self.eof))
    }

    /// Span of the last consumed token.
    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.spans.get(i))
            .copied()
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        self.skip_insignificant();
        let token = self.tokens.get(self.pos)?.clone();
        let span = self.spans[self.pos];
        self.pos += 1;
        match token {
            Token::LParen | Token::LBracket | Token::LBrace => self.depth += 1,
            Token::RParen | Token::RBracket | Token::RBrace => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Some((token, span))
    }

    fn eat(&mut self, token: &Token) -> Option<Span> {
        if self.at(token) {
            self.advance().map(|(_, span)| span)
        } else {
            None
        }
    }

    fn expect(&mut self, token: &Token) -> PResult<Span> {
        match self.eat(token) {
            Some(span) => Ok(span),
            None => Err(self.unexpected(&format!("'{}'", token))),
        }
    }

    /// Error for the current token when `expected` was wanted instead.
    fn unexpected(&mut self, expected: &str) -> ParseError {
        let span = self.current_span();
        match self.peek() {
            Some(token) => ParseError::new(format!("Expected {}, found '{}'", expected, token), span),
            None => ParseError::new(format!("Expected {}, found end of file", expected), span),
        }
    }

    fn node(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.ast.push(kind, span);
        let height = self
            .ast
            .children(id)
            .iter()
            .filter_map(|c| self.heights.get(c.index()))
            .max()
            .map_or(1, |h| h + 1);
        // the arena may have been truncated by error recovery
        self.heights.truncate(id.index());
        self.heights.push(height);
        id
    }

    fn height(&self, id: NodeId) -> u32 {
        self.heights.get(id.index()).copied().unwrap_or(1)
    }

    /// Run `parse` one nesting level deeper, failing once [`MAX_NESTING`] is reached.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.nesting >= MAX_NESTING {
            let span = self.current_span();
            return Err(ParseError::new("Nesting is too deep", span));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.ast.span(id)
    }

    /// Skip to the next line break outside of any bracket.
    fn skip_line(&mut self) {
        self.depth = 0;
        while let Some(token) = self.tokens.get(self.pos) {
            if *token == Token::Newline {
                break;
            }
            self.pos += 1;
        }
    }

    /// Replace everything parsed since `mark`/`start` with an `ErrorNode` that
    /// extends to the end of the current line.
    fn recover(&mut self, mark: usize, start: usize, err: ParseError) -> NodeId {
        self.ast.truncate(mark);
        if self.pos == start && self.tokens.get(self.pos).is_some_and(|t| *t != Token::Newline) {
            self.pos += 1;
        }
        self.skip_line();
        let first = self.spans.get(start).copied().unwrap_or(err.span);
        let span = if self.pos > start { first.to(&self.prev_span()) } else { err.span };
        let message = err.message.clone();
        self.errors.push(err);
        self.node(NodeKind::ErrorNode { message }, span)
    }
}
