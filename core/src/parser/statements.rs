use super::{PResult, Parser};
use crate::{
    ast::{NodeId, NodeKind},
    op::AssignOp,
    token::{ParseError, Token},
};

impl Parser {
    /// Statements up to a block terminator (`elif`, `else`, `endif`,
    /// `endforeach`) or the end of input. At top level a terminator has no
    /// block to close and is reported.
    pub(super) fn parse_block(&mut self, top_level: bool) -> Vec<NodeId> {
        let mut statements = Vec::new();
        loop {
            self.depth = 0;
            let Some(token) = self.tokens.get(self.pos) else {
                break;
            };
            if *token == Token::Newline {
                self.pos += 1;
                continue;
            }
            if token.is_block_end() {
                if !top_level {
                    break;
                }
                let mark = self.ast.len();
                let start = self.pos;
                let err = ParseError::new(format!("Unexpected '{}'", token), self.spans[self.pos]);
                statements.push(self.recover(mark, start, err));
                continue;
            }

            let mark = self.ast.len();
            let start = self.pos;
            match self.parse_statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    if let Some(junk) = self.finish_line() {
                        statements.push(junk);
                    }
                }
                Err(err) => statements.push(self.recover(mark, start, err)),
            }
        }
        statements
    }

    /// Require the end of a line after a statement. Trailing tokens become an `ErrorNode`.
    fn finish_line(&mut self) -> Option<NodeId> {
        self.depth = 0;
        // a block that ended on a terminator of its parent already consumed the line break
        if self.pos > 0 && self.tokens.get(self.pos - 1) == Some(&Token::Newline) {
            return None;
        }
        match self.tokens.get(self.pos) {
            None => None,
            Some(Token::Newline) => {
                self.pos += 1;
                None
            }
            Some(_) => {
                let err = self.unexpected("end of line");
                let mark = self.ast.len();
                let start = self.pos;
                Some(self.recover(mark, start, err))
            }
        }
    }

    /// Like [`Parser::finish_line`] for block headers, where leftovers are only reported.
    fn finish_header(&mut self) {
        if let Some(junk) = self.finish_line() {
            self.ast.truncate(junk.index());
        }
    }

    fn parse_statement(&mut self) -> PResult<NodeId> {
        match self.peek() {
            Some(Token::If) => self.nested(|p| Ok(p.parse_if())),
            Some(Token::Foreach) => self.nested(|p| Ok(p.parse_foreach())),
            Some(Token::Break) => {
                let span = self.current_span();
                self.advance();
                Ok(self.node(NodeKind::BreakNode, span))
            }
            Some(Token::Continue) => {
                let span = self.current_span();
                self.advance();
                Ok(self.node(NodeKind::ContinueNode, span))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> PResult<NodeId> {
        let lhs = self.parse_expression()?;
        let Some(op) = self.peek().and_then(AssignOp::from_token) else {
            return Ok(lhs);
        };
        self.advance();
        if !matches!(self.ast.kind(lhs), NodeKind::IdExpression { .. }) {
            self.errors.push(ParseError::new(
                "Assignment target must be an identifier",
                self.span_of(lhs),
            ));
        }
        let rhs = self.parse_expression()?;
        let span = self.span_of(lhs).to(&self.span_of(rhs));
        Ok(self.node(NodeKind::AssignmentStatement { lhs, op, rhs }, span))
    }

    /// Expression that turns into an `ErrorNode` on failure instead of
    /// aborting the enclosing block statement.
    fn parse_expression_or_error(&mut self) -> NodeId {
        let mark = self.ast.len();
        let start = self.pos;
        match self.parse_expression() {
            Ok(expr) => expr,
            Err(err) => self.recover(mark, start, err),
        }
    }

    fn parse_if(&mut self) -> NodeId {
        let start_span = self.current_span();
        self.advance();

        let mut conditions = vec![self.parse_expression_or_error()];
        self.finish_header();
        let mut blocks = vec![self.parse_block(false)];
        let mut has_else = false;

        loop {
            self.depth = 0;
            match self.tokens.get(self.pos) {
                Some(Token::Elif) => {
                    if has_else {
                        self.errors
                            .push(ParseError::new("'elif' after 'else'", self.spans[self.pos]));
                    }
                    self.advance();
                    conditions.push(self.parse_expression_or_error());
                    self.finish_header();
                    blocks.push(self.parse_block(false));
                }
                Some(Token::Else) => {
                    if has_else {
                        self.errors
                            .push(ParseError::new("Duplicate 'else'", self.spans[self.pos]));
                    }
                    has_else = true;
                    self.advance();
                    self.finish_header();
                    blocks.push(self.parse_block(false));
                }
                Some(Token::Endif) => {
                    self.advance();
                    break;
                }
                _ => {
                    let err = self.unexpected("'endif'");
                    self.errors.push(err);
                    break;
                }
            }
        }

        // a duplicate else leaves more blocks than one past the conditions
        while blocks.len() > conditions.len() + 1 {
            if let Some(extra) = blocks.pop()
                && let Some(last) = blocks.last_mut()
            {
                last.extend(extra);
            }
        }

        let span = start_span.to(&self.prev_span());
        self.node(NodeKind::SelectionStatement { conditions, blocks }, span)
    }

    fn parse_foreach_header(&mut self) -> PResult<(Vec<NodeId>, NodeId)> {
        let mut ids = Vec::new();
        loop {
            let span = self.current_span();
            match self.peek() {
                Some(Token::Id(name)) => {
                    let name = name.clone();
                    self.advance();
                    ids.push(self.node(NodeKind::IdExpression { name }, span));
                }
                _ => return Err(self.unexpected("loop variable name")),
            }
            if self.eat(&Token::Comma).is_none() {
                break;
            }
        }
        if ids.len() > 2 {
            return Err(ParseError::new(
                "A foreach loop takes at most two variables",
                self.span_of(ids[0]).to(&self.prev_span()),
            ));
        }
        self.expect(&Token::Colon)?;
        let expression = self.parse_expression()?;
        Ok((ids, expression))
    }

    fn parse_foreach(&mut self) -> NodeId {
        let start_span = self.current_span();
        self.advance();

        let mark = self.ast.len();
        let start = self.pos;
        let (ids, expression) = match self.parse_foreach_header() {
            Ok(header) => header,
            Err(err) => (Vec::new(), self.recover(mark, start, err)),
        };
        self.finish_header();
        let block = self.parse_block(false);

        self.depth = 0;
        if self.tokens.get(self.pos) == Some(&Token::Endforeach) {
            self.advance();
        } else {
            let err = self.unexpected("'endforeach'");
            self.errors.push(err);
        }

        let span = start_span.to(&self.prev_span());
        self.node(
            NodeKind::IterationStatement {
                ids,
                expression,
                block,
            },
            span,
        )
    }
}
