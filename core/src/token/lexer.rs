use std::fmt;

use crate::token::{ParseError, Position, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    Colon,     // :
    Comma,     // ,
    Question,  // ?
    Assign,    // =
    AddAssign, // +=
    SubAssign, // -=
    MulAssign, // *=
    DivAssign, // /=
    ModAssign, // %=
    Eq,        // ==
    Ne,        // !=
    Gt,        // >
    Lt,        // <
    Ge,        // >=
    Le,        // <=
    Add,       // +
    Sub,       // -
    Mul,       // *
    Div,       // /
    Mod,       // %
    // Statement keywords
    If,         // if
    Elif,       // elif
    Else,       // else
    Endif,      // endif
    Foreach,    // foreach
    Endforeach, // endforeach
    Break,      // break
    Continue,   // continue
    // Word operators
    And, // and
    Or,  // or
    Not, // not
    In,  // in
    Str {
        value: String,
        format: bool,
        multiline: bool,
    },
    Int(i64),
    Bool(bool),
    Id(String),
    /// End of a line. The parser ignores it inside brackets.
    Newline,
    /// A character that cannot start any token.
    Unknown(char),
}

impl Token {
    pub fn keyword(word: &str) -> Option<Token> {
        Some(match word {
            "if" => Token::If,
            "elif" => Token::Elif,
            "else" => Token::Else,
            "endif" => Token::Endif,
            "foreach" => Token::Foreach,
            "endforeach" => Token::Endforeach,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => return None,
        })
    }

    /// Tokens that close an indented block.
    pub fn is_block_end(&self) -> bool {
        matches!(self, Token::Elif | Token::Else | Token::Endif | Token::Endforeach)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::If
                | Token::Elif
                | Token::Else
                | Token::Endif
                | Token::Foreach
                | Token::Endforeach
                | Token::Break
                | Token::Continue
                | Token::And
                | Token::Or
                | Token::Not
                | Token::In
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Question => "?",
            Token::Assign => "=",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::DivAssign => "/=",
            Token::ModAssign => "%=",
            Token::Eq => "==",
            Token::Ne => "!=",
            Token::Gt => ">",
            Token::Lt => "<",
            Token::Ge => ">=",
            Token::Le => "<=",
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Div => "/",
            Token::Mod => "%",
            Token::If => "if",
            Token::Elif => "elif",
            Token::Else => "else",
            Token::Endif => "endif",
            Token::Foreach => "foreach",
            Token::Endforeach => "endforeach",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::In => "in",
            Token::Str { .. } => "string",
            Token::Int(v) => return write!(f, "{}", v),
            Token::Bool(b) => return write!(f, "{}", b),
            Token::Id(name) => name,
            Token::Newline => "end of line",
            Token::Unknown(c) => return write!(f, "{}", c),
        };
        f.write_str(text)
    }
}

/// Output of the tokenizer: tokens with index-aligned spans plus lexical errors.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub spans: Vec<Span>,
    pub errors: Vec<ParseError>,
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Converts Meson source into tokens. Never fails: malformed input yields
/// `Token::Unknown` entries or truncated literals plus a recorded error.
pub struct Tokenizer<'a> {
    chars: Vec<char>,
    idx: usize,
    len: usize,
    byte: usize,
    line: u32,
    column: u32,
    input: &'a str,
    out: Lexed,
}

impl<'a> Tokenizer<'a> {
    pub fn tokenize(input: &'a str) -> Lexed {
        let chars: Vec<char> = input.chars().collect();
        let mut t = Tokenizer {
            len: chars.len(),
            chars,
            idx: 0,
            byte: 0,
            line: 0,
            column: 0,
            input,
            out: Lexed {
                tokens: Vec::with_capacity(input.len() / 4),
                spans: Vec::with_capacity(input.len() / 4),
                errors: Vec::new(),
            },
        };
        t.run();
        t.out
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column, self.byte)
    }

    fn eof(&self) -> bool {
        self.idx >= self.len
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.idx + ahead).copied()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
            self.byte += c.len_utf8();
            self.idx += 1;
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn push(&mut self, token: Token, start: Position) {
        let end = self.current_position();
        self.out.tokens.push(token);
        self.out.spans.push(Span::new(start, end));
    }

    fn error(&mut self, message: impl Into<String>, start: Position) {
        let end = self.current_position();
        self.out.errors.push(ParseError::new(message, Span::new(start, end)));
    }

    fn run(&mut self) {
        while !self.eof() {
            let c = self.chars[self.idx];
            let start = self.current_position();
            match c {
                '\n' => {
                    self.advance_char();
                    self.push(Token::Newline, start);
                }
                ' ' | '\t' | '\r' => self.advance_char(),
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                '\'' => self.lex_string(false, start),
                'f' if self.peek_at(1) == Some('\'') => {
                    self.advance_char();
                    self.lex_string(true, start);
                }
                c if c.is_ascii_digit() => self.lex_number(start),
                c if is_ident_start(c) => self.lex_word(start),
                _ => self.lex_punct(c, start),
            }
        }
    }

    fn lex_punct(&mut self, c: char, start: Position) {
        let two = |t: &Self, s: &str| t.starts_with(s);
        let (token, width) = if two(self, "==") {
            (Token::Eq, 2)
        } else if two(self, "!=") {
            (Token::Ne, 2)
        } else if two(self, ">=") {
            (Token::Ge, 2)
        } else if two(self, "<=") {
            (Token::Le, 2)
        } else if two(self, "+=") {
            (Token::AddAssign, 2)
        } else if two(self, "-=") {
            (Token::SubAssign, 2)
        } else if two(self, "*=") {
            (Token::MulAssign, 2)
        } else if two(self, "/=") {
            (Token::DivAssign, 2)
        } else if two(self, "%=") {
            (Token::ModAssign, 2)
        } else {
            let token = match c {
                '(' => Token::LParen,
                ')' => Token::RParen,
                '[' => Token::LBracket,
                ']' => Token::RBracket,
                '{' => Token::LBrace,
                '}' => Token::RBrace,
                '.' => Token::Dot,
                ':' => Token::Colon,
                ',' => Token::Comma,
                '?' => Token::Question,
                '=' => Token::Assign,
                '>' => Token::Gt,
                '<' => Token::Lt,
                '+' => Token::Add,
                '-' => Token::Sub,
                '*' => Token::Mul,
                '/' => Token::Div,
                '%' => Token::Mod,
                other => Token::Unknown(other),
            };
            (token, 1)
        };
        for _ in 0..width {
            self.advance_char();
        }
        if let Token::Unknown(ch) = token {
            self.error(format!("Unexpected character '{}'", ch), start);
        }
        self.push(token, start);
    }

    fn lex_word(&mut self, start: Position) {
        let from = self.byte;
        while let Some(c) = self.peek() {
            if !is_ident_continue(c) {
                break;
            }
            self.advance_char();
        }
        let word = &self.input[from..self.byte];
        let token = Token::keyword(word).unwrap_or_else(|| Token::Id(word.to_string()));
        self.push(token, start);
    }

    fn lex_number(&mut self, start: Position) {
        let from = self.byte;
        let radix = match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('o' | 'O')) => 8,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.advance_char();
            self.advance_char();
        }
        let digits_from = self.byte;
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            self.advance_char();
        }
        let digits = &self.input[digits_from..self.byte];
        let value = match i64::from_str_radix(digits, radix) {
            Ok(v) => v,
            Err(_) => {
                let raw = self.input[from..self.byte].to_string();
                self.error(format!("Invalid integer literal '{}'", raw), start);
                0
            }
        };
        self.push(Token::Int(value), start);
    }

    fn lex_string(&mut self, format: bool, start: Position) {
        if self.starts_with("'''") {
            self.advance_char();
            self.advance_char();
            self.advance_char();
            let from = self.byte;
            while !self.eof() && !self.starts_with("'''") {
                self.advance_char();
            }
            let value = self.input[from..self.byte].to_string();
            if self.eof() {
                self.error("Multiline string not closed", start);
            } else {
                self.advance_char();
                self.advance_char();
                self.advance_char();
            }
            self.push(
                Token::Str {
                    value,
                    format,
                    multiline: true,
                },
                start,
            );
            return;
        }

        self.advance_char(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("String not closed", start);
                    break;
                }
                Some('\'') => {
                    self.advance_char();
                    break;
                }
                Some('\\') => {
                    self.advance_char();
                    self.lex_escape(&mut value);
                }
                Some(c) => {
                    value.push(c);
                    self.advance_char();
                }
            }
        }
        self.push(
            Token::Str {
                value,
                format,
                multiline: false,
            },
            start,
        );
    }

    fn take_hex(&mut self, count: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            value = value * 16 + digit;
            self.advance_char();
        }
        Some(value)
    }

    fn lex_escape(&mut self, out: &mut String) {
        let Some(c) = self.peek() else {
            out.push('\\');
            return;
        };
        let simple = match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'v' => Some('\u{0B}'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            _ => None,
        };
        if let Some(ch) = simple {
            out.push(ch);
            self.advance_char();
            return;
        }
        match c {
            '0'..='7' => {
                let mut value = 0u32;
                let mut taken = 0;
                while taken < 3 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            self.advance_char();
                            taken += 1;
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            'x' | 'u' | 'U' => {
                let width = match c {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let start = self.current_position();
                self.advance_char();
                match self.take_hex(width).and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => self.error("Invalid escape sequence", start),
                }
            }
            other => {
                // unknown escapes are kept verbatim
                out.push('\\');
                out.push(other);
                self.advance_char();
            }
        }
    }
}
