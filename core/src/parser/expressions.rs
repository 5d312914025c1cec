use super::{MAX_EXPRESSION_HEIGHT, PResult, Parser};
use crate::{
    ast::{NodeId, NodeKind},
    op::{BinOp, UnaryOp},
    token::{ParseError, Span, Token},
};

impl Parser {
    pub(super) fn parse_expression(&mut self) -> PResult<NodeId> {
        let expr = self.nested(Self::parse_conditional)?;
        if self.height(expr) > MAX_EXPRESSION_HEIGHT {
            return Err(ParseError::new("Expression is too deeply nested", self.span_of(expr)));
        }
        Ok(expr)
    }

    /// `condition ? a : b`, right-associative.
    fn parse_conditional(&mut self) -> PResult<NodeId> {
        let condition = self.parse_or()?;
        if self.eat(&Token::Question).is_none() {
            return Ok(condition);
        }
        let if_true = self.nested(Self::parse_conditional)?;
        self.expect(&Token::Colon)?;
        let if_false = self.nested(Self::parse_conditional)?;
        let span = self.span_of(condition).to(&self.span_of(if_false));
        Ok(self.node(
            NodeKind::ConditionalExpression {
                condition,
                if_true,
                if_false,
            },
            span,
        ))
    }

    fn binary(&mut self, lhs: NodeId, op: BinOp, rhs: NodeId) -> NodeId {
        let span = self.span_of(lhs).to(&self.span_of(rhs));
        self.node(NodeKind::BinaryExpression { lhs, op, rhs }, span)
    }

    fn parse_or(&mut self) -> PResult<NodeId> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or).is_some() {
            let rhs = self.parse_and()?;
            lhs = self.binary(lhs, BinOp::Or, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<NodeId> {
        let mut lhs = self.parse_comparison()?;
        while self.eat(&Token::And).is_some() {
            let rhs = self.parse_comparison()?;
            lhs = self.binary(lhs, BinOp::And, rhs);
        }
        Ok(lhs)
    }

    fn comparison_op(&mut self) -> Option<BinOp> {
        let token = self.peek().cloned()?;
        match token {
            Token::In => Some(BinOp::In),
            Token::Not => (self.peek_second() == Some(&Token::In)).then_some(BinOp::NotIn),
            other => BinOp::cmp_from_token(&other),
        }
    }

    fn parse_comparison(&mut self) -> PResult<NodeId> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.comparison_op() {
            self.advance();
            if op == BinOp::NotIn {
                self.advance();
            }
            let rhs = self.parse_additive()?;
            lhs = self.binary(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<NodeId> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Add) => BinOp::Add,
                Some(Token::Sub) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<NodeId> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Mul) => BinOp::Mul,
                Some(Token::Div) => BinOp::Div,
                Some(Token::Mod) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = self.binary(lhs, op, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<NodeId> {
        let op = match self.peek() {
            Some(Token::Not) => UnaryOp::Not,
            Some(Token::Sub) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        let start = self.current_span();
        self.advance();
        let expression = self.nested(Self::parse_unary)?;
        let span = start.to(&self.span_of(expression));
        Ok(self.node(NodeKind::UnaryExpression { op, expression }, span))
    }

    fn parse_postfix(&mut self) -> PResult<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => expr = self.parse_method(expr)?,
                Some(Token::LBracket) => {
                    self.advance();
                    let inner = self.parse_expression()?;
                    let close = self.expect(&Token::RBracket)?;
                    let span = self.span_of(expr).to(&close);
                    expr = self.node(NodeKind::SubscriptExpression { outer: expr, inner }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `object.name(args)`. A dot without a following name still yields a
    /// `MethodExpression` whose id is an `ErrorNode`, so completion has a node
    /// to anchor on.
    fn parse_method(&mut self, object: NodeId) -> PResult<NodeId> {
        let (_, dot) = self.advance().unwrap_or((Token::Dot, Span::default()));
        let name_span = self.current_span();
        let name = match self.peek() {
            Some(Token::Id(name)) => Some(name.clone()),
            _ => None,
        };
        let Some(name) = name else {
            let err = ParseError::new("Expected method name after '.'", Span::single(dot.end));
            let message = err.message.clone();
            self.errors.push(err);
            let id = self.node(NodeKind::ErrorNode { message }, Span::single(dot.end));
            let span = self.span_of(object).to(&dot);
            return Ok(self.node(NodeKind::MethodExpression { object, id, args: None }, span));
        };
        self.advance();
        let id = self.node(NodeKind::IdExpression { name }, name_span);

        let args = if self.at(&Token::LParen) {
            Some(self.parse_arguments()?)
        } else {
            let err = self.unexpected("'(' after method name");
            self.errors.push(err);
            None
        };
        let end = args.map(|a| self.span_of(a)).unwrap_or(name_span);
        let span = self.span_of(object).to(&end);
        Ok(self.node(NodeKind::MethodExpression { object, id, args }, span))
    }

    /// `(positional, ..., key: value, ...)`, trailing comma allowed.
    fn parse_arguments(&mut self) -> PResult<NodeId> {
        let open = self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        let close = loop {
            if let Some(close) = self.eat(&Token::RParen) {
                break close;
            }
            let value = self.parse_expression()?;
            let arg = if self.eat(&Token::Colon).is_some() {
                if !matches!(self.ast.kind(value), NodeKind::IdExpression { .. }) {
                    return Err(ParseError::new(
                        "Keyword argument name must be an identifier",
                        self.span_of(value),
                    ));
                }
                let kwarg_value = self.parse_expression()?;
                let span = self.span_of(value).to(&self.span_of(kwarg_value));
                self.node(
                    NodeKind::KeywordItem {
                        key: value,
                        value: kwarg_value,
                    },
                    span,
                )
            } else {
                value
            };
            args.push(arg);
            if self.eat(&Token::Comma).is_none() {
                break self.expect(&Token::RParen).map_err(|_| self.unexpected("',' or ')'"))?;
            }
        };
        Ok(self.node(NodeKind::ArgumentList { args }, open.to(&close)))
    }

    fn parse_primary(&mut self) -> PResult<NodeId> {
        let span = self.current_span();
        if matches!(self.peek(), None | Some(Token::Newline)) {
            return Err(self.unexpected("an expression"));
        }
        let Some((token, _)) = self.advance() else {
            return Err(ParseError::new("Unexpected end of file", span));
        };
        let kind = match token {
            Token::Int(value) => {
                let raw = self.ast.source().get(span.start.offset..span.end.offset).unwrap_or("").to_string();
                NodeKind::IntegerLiteral { value, raw }
            }
            Token::Bool(value) => NodeKind::BooleanLiteral { value },
            Token::Str {
                value,
                format,
                multiline,
            } => NodeKind::StringLiteral {
                value,
                format,
                multiline,
            },
            Token::Id(name) => {
                let id = self.node(NodeKind::IdExpression { name }, span);
                if !self.at(&Token::LParen) {
                    return Ok(id);
                }
                let args = self.parse_arguments()?;
                let full = span.to(&self.span_of(args));
                return Ok(self.node(NodeKind::FunctionExpression { id, args }, full));
            }
            Token::LParen => {
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            Token::LBracket => {
                let mut elements = Vec::new();
                let close = loop {
                    if let Some(close) = self.eat(&Token::RBracket) {
                        break close;
                    }
                    elements.push(self.parse_expression()?);
                    if self.eat(&Token::Comma).is_none() {
                        break self.expect(&Token::RBracket).map_err(|_| self.unexpected("',' or ']'"))?;
                    }
                };
                return Ok(self.node(NodeKind::ArrayLiteral { elements }, span.to(&close)));
            }
            Token::LBrace => {
                let mut items = Vec::new();
                let close = loop {
                    if let Some(close) = self.eat(&Token::RBrace) {
                        break close;
                    }
                    let key = self.parse_expression()?;
                    self.expect(&Token::Colon)?;
                    let value = self.parse_expression()?;
                    let item_span = self.span_of(key).to(&self.span_of(value));
                    items.push(self.node(NodeKind::KeyValueItem { key, value }, item_span));
                    if self.eat(&Token::Comma).is_none() {
                        break self.expect(&Token::RBrace).map_err(|_| self.unexpected("',' or '}'"))?;
                    }
                };
                return Ok(self.node(NodeKind::DictionaryLiteral { items }, span.to(&close)));
            }
            other => {
                return Err(ParseError::new(format!("Unexpected '{}'", other), span));
            }
        };
        Ok(self.node(kind, span))
    }
}
